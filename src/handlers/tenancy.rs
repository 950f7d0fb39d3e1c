// src/handlers/tenancy.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{AdminOnly, RequireRole},
    },
    models::{stock::StockLevels, tenancy::ProvisionedTenant},
};

// ---
// 1. "Payload" (O "Formulário" da API)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantPayload {
    #[validate(length(min = 1, max = 100, message = "O nome do ambiente é obrigatório e tem no máximo 100 caracteres."))]
    #[schema(example = "Ultra Gás Centro")]
    pub name: String,
    // Sem estoque inicial => tudo zerado
    #[serde(default)]
    pub initial_stock: Option<StockLevels>,
}

// ---
// 2. O "Handler" (A Rota)
// ---
#[utoipa::path(
    post,
    path = "/api/tenants",
    tag = "Tenancy",
    request_body = CreateTenantPayload,
    responses(
        (status = 201, description = "Ambiente e estoque criados", body = ProvisionedTenant),
        (status = 403, description = "Apenas administradores"),
        (status = 409, description = "Nome já existe"),
        (status = 422, description = "Estoque inicial acima da capacidade")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_tenant(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateTenantPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let provisioned = app_state
        .tenant_service
        .provision_tenant(&payload.name, payload.initial_stock.unwrap_or_default())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(provisioned)))
}
