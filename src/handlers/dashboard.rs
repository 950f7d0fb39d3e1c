// src/handlers/dashboard.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        tenancy::TenantContext,
    },
    models::dashboard::{DashboardCards, FinanceSummary},
};

// GET /api/dashboard/cards
#[utoipa::path(
    get,
    path = "/api/dashboard/cards",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Números dos cards do painel", body = DashboardCards),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_cards(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let cards = app_state
        .dashboard_service
        .get_cards(tenant.0, &user.0.name)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(cards)))
}

// GET /api/dashboard/finance
#[utoipa::path(
    get,
    path = "/api/dashboard/finance",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Vendas do dia, recebido, pendente e entregas por forma de pagamento", body = FinanceSummary),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_finance(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let finance = app_state
        .dashboard_service
        .get_finance(tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(finance)))
}
