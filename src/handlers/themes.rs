// src/handlers/themes.rs

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{RequireRole, Staff},
        tenancy::TenantContext,
    },
    models::theme::{CurrentTheme, ThemeApplied, ThemeNames},
};

// ---
// Payloads (aceitam os nomes em português do painel antigo)
// ---

#[derive(Debug, Deserialize, ToSchema)]
pub struct CustomThemePayload {
    #[serde(alias = "tema")]
    #[schema(example = "noite")]
    pub theme: String,
    #[serde(alias = "cores")]
    pub variables: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyThemePayload {
    #[serde(default, alias = "tema")]
    #[schema(example = "rosa")]
    pub theme: String,
}

// GET /api/themes
#[utoipa::path(
    get,
    path = "/api/themes",
    tag = "Themes",
    responses(
        (status = 200, description = "Tema -> variável -> valor", body = BTreeMap<String, BTreeMap<String, String>>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_themes(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let themes = app_state
        .theme_service
        .list_themes(tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(themes))
}

// GET /api/themes/names
#[utoipa::path(
    get,
    path = "/api/themes/names",
    tag = "Themes",
    responses((status = 200, description = "Nomes de temas disponíveis", body = ThemeNames)),
    security(("api_jwt" = []))
)]
pub async fn list_theme_names(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let themes = app_state
        .theme_service
        .list_theme_names(tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(ThemeNames { themes }))
}

// GET /api/themes/current
#[utoipa::path(
    get,
    path = "/api/themes/current",
    tag = "Themes",
    responses((status = 200, description = "Variáveis do tema do usuário", body = CurrentTheme)),
    security(("api_jwt" = []))
)]
pub async fn current_theme(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let current = app_state
        .theme_service
        .current_theme(&user.0)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(current))
}

// POST /api/themes/custom
#[utoipa::path(
    post,
    path = "/api/themes/custom",
    tag = "Themes",
    request_body = CustomThemePayload,
    responses(
        (status = 201, description = "Tema do ambiente substituído", body = CurrentTheme),
        (status = 400, description = "Tema ou cores vazios")
    ),
    security(("api_jwt" = []))
)]
pub async fn save_custom_theme(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<Staff>,
    Json(payload): Json<CustomThemePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let saved = app_state
        .theme_service
        .replace_theme(tenant.0, &payload.theme, &payload.variables)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(saved)))
}

// POST /api/themes/{name}/apply
#[utoipa::path(
    post,
    path = "/api/themes/{name}/apply",
    tag = "Themes",
    params(("name" = String, Path, description = "Nome do tema")),
    responses((status = 200, description = "Tema aplicado ao usuário", body = CurrentTheme)),
    security(("api_jwt" = []))
)]
pub async fn apply_theme_to_me(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let current = app_state
        .theme_service
        .apply_to_user(&user.0, &name)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(current))
}

// POST /api/themes/apply-to-tenant
#[utoipa::path(
    post,
    path = "/api/themes/apply-to-tenant",
    tag = "Themes",
    request_body = ApplyThemePayload,
    responses((status = 200, description = "Tema aplicado a todos os usuários do ambiente", body = ThemeApplied)),
    security(("api_jwt" = []))
)]
pub async fn apply_theme_to_tenant(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<Staff>,
    Json(payload): Json<ApplyThemePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let applied = app_state
        .theme_service
        .apply_to_tenant(tenant.0, &payload.theme)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(applied))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn custom_theme_accepts_portuguese_keys() {
        let payload: CustomThemePayload = serde_json::from_value(json!({
            "tema": "noite",
            "cores": {"cor-fundo": "#000000"}
        }))
        .unwrap();

        assert_eq!(payload.theme, "noite");
        assert_eq!(payload.variables["cor-fundo"], "#000000");
    }

    #[test]
    fn missing_theme_name_deserializes_as_blank() {
        let payload: ApplyThemePayload = serde_json::from_value(json!({})).unwrap();

        assert_eq!(payload.theme, "");
    }
}
