// src/handlers/stock.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::stock::StockSummary,
};

// GET /api/stock
#[utoipa::path(
    get,
    path = "/api/stock",
    tag = "Stock",
    responses(
        (status = 200, description = "Contadores e ocupação do estoque", body = StockSummary),
        (status = 404, description = "Ambiente sem estoque")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .stock_service
        .get_summary(tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(summary))
}
