// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    middleware::i18n::Locale,
};

// O ambiente ("tenant") em que a requisição opera.
// Preenchido pelo auth_guard a partir do usuário autenticado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext(pub Uuid);

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .copied()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&Locale::from_parts(parts)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    #[tokio::test]
    async fn reads_tenant_set_by_guard() {
        let tenant_id = Uuid::new_v4();
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        parts.extensions.insert(TenantContext(tenant_id));

        let tenant = TenantContext::from_request_parts(&mut parts, &()).await.unwrap();

        assert_eq!(tenant, TenantContext(tenant_id));
    }

    #[tokio::test]
    async fn without_guard_there_is_no_tenant() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();

        let err = TenantContext::from_request_parts(&mut parts, &()).await.unwrap_err();

        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}
