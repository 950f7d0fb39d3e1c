// src/handlers/customers.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{RequireRole, Staff},
        tenancy::TenantContext,
    },
    models::customers::{Customer, CustomerResponse},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerPayload {
    // Aceita também o nome usado pelo painel antigo
    #[serde(alias = "endereco")]
    #[validate(length(max = 255, message = "O endereço deve ter no máximo 255 caracteres."))]
    #[schema(example = "Rua das Flores, 123")]
    pub address: String,
}

#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Customers",
    request_body = CreateCustomerPayload,
    responses(
        (status = 201, description = "Cliente cadastrado", body = CustomerResponse),
        (status = 400, description = "Endereço vazio ou longo demais")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<Staff>,
    Json(payload): Json<CreateCustomerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let customer = app_state
        .customer_service
        .create_customer(tenant.0, &payload.address)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(CustomerResponse { ok: true, customer })))
}

#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    responses(
        (status = 200, description = "Clientes do ambiente", body = Vec<Customer>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let customers = app_state
        .customer_service
        .list_customers(tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(customers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_key_and_length_limit() {
        let ok: CreateCustomerPayload =
            serde_json::from_value(json!({"endereco": "Rua das Flores, 123"})).unwrap();
        assert_eq!(ok.address, "Rua das Flores, 123");
        assert!(ok.validate().is_ok());

        let long: CreateCustomerPayload =
            serde_json::from_value(json!({"address": "R".repeat(256)})).unwrap();
        assert!(long.validate().is_err());
    }
}
