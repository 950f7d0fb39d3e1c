// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::UserRole,
};

/// 1. O Trait que define quais papéis passam pela guarda
pub trait RoleSet: Send + Sync + 'static {
    fn allows(role: UserRole) -> bool;
}

/// 2. O Extractor (Guardião)
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleSet,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = Locale::from_parts(parts);

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale))?;

        if !T::allows(user.0.role) {
            tracing::warn!("Acesso negado para {} ({:?})", user.0.email, user.0.role);
            return Err(AppError::Forbidden.to_api_error(&locale));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS GRUPOS DE PAPÉIS
// ---

/// Administrador global ou do ambiente.
pub struct Staff;
impl RoleSet for Staff {
    fn allows(role: UserRole) -> bool { role.is_staff() }
}

/// Somente o administrador global.
pub struct AdminOnly;
impl RoleSet for AdminOnly {
    fn allows(role: UserRole) -> bool { role == UserRole::Admin }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use crate::middleware::auth::tests::user_with_role;

    async fn check<T: RoleSet>(role: Option<UserRole>) -> Result<(), StatusCode> {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        if let Some(role) = role {
            parts.extensions.insert(AuthenticatedUser(user_with_role(role)));
        }
        RequireRole::<T>::from_request_parts(&mut parts, &())
            .await
            .map(|_| ())
            .map_err(|e| e.status)
    }

    #[tokio::test]
    async fn staff_guard_admits_both_admin_roles() {
        assert_eq!(check::<Staff>(Some(UserRole::Admin)).await, Ok(()));
        assert_eq!(check::<Staff>(Some(UserRole::TenantAdmin)).await, Ok(()));
        assert_eq!(check::<Staff>(Some(UserRole::Courier)).await, Err(StatusCode::FORBIDDEN));
    }

    #[tokio::test]
    async fn admin_guard_rejects_tenant_admin() {
        assert_eq!(check::<AdminOnly>(Some(UserRole::Admin)).await, Ok(()));
        assert_eq!(check::<AdminOnly>(Some(UserRole::TenantAdmin)).await, Err(StatusCode::FORBIDDEN));
    }

    #[tokio::test]
    async fn anonymous_is_unauthorized() {
        assert_eq!(check::<Staff>(None).await, Err(StatusCode::UNAUTHORIZED));
    }
}
