// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
    RequestExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::auth::User,
};

/// Guarda das rotas protegidas: valida o Bearer token, carrega o usuário
/// e fixa o ambiente dele como contexto da requisição.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = request
        .extract_parts::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| AppError::InvalidToken.to_api_error(&locale))?;

    let user = app_state
        .auth_service
        .validate_token(bearer.token())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    // O ambiente vem SEMPRE do usuário autenticado, nunca do cliente
    let tenant = TenantContext(user.tenant_id);
    request.extensions_mut().insert(tenant);
    request.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&Locale::from_parts(parts)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use uuid::Uuid;
    use crate::models::auth::UserRole;

    pub(crate) fn user_with_role(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Carlos".into(),
            email: "carlos@example.com".into(),
            password_hash: "hash".into(),
            theme: "root".into(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn extractor_reads_user_from_extensions() {
        let user = user_with_role(UserRole::Courier);
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        parts.extensions.insert(AuthenticatedUser(user.clone()));

        let AuthenticatedUser(found) = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();

        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn missing_user_is_unauthorized() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();

        let err = AuthenticatedUser::from_request_parts(&mut parts, &()).await.unwrap_err();

        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}
