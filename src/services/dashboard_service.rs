// src/services/dashboard_service.rs

use uuid::Uuid;
use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::{
        dashboard::{DashboardCards, FinanceSummary},
        stock::StockSummary,
    },
    services::stock_service::StockService,
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    stock_service: StockService,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, stock_service: StockService) -> Self {
        Self { repo, stock_service }
    }

    /// Cards do painel. `courier` é o nome de exibição de quem consulta.
    pub async fn get_cards(&self, tenant_id: Uuid, courier: &str) -> Result<DashboardCards, AppError> {
        let counts = self.repo.get_order_counts(tenant_id, courier.trim()).await?;

        // Ambiente sem registro de estoque mostra 0% em vez de quebrar o painel
        let stock_percent = match self.stock_service.get_summary(tenant_id).await {
            Ok(StockSummary { percent, .. }) => percent,
            Err(AppError::ResourceNotFound(_)) => 0,
            Err(e) => return Err(e),
        };

        Ok(DashboardCards {
            pending_orders: counts.pending_orders,
            orders_today: counts.orders_today,
            couriers_on_route: counts.couriers_on_route,
            stock_percent,
            my_current_deliveries: counts.my_current_deliveries,
            my_completed_deliveries: counts.my_completed_deliveries,
        })
    }

    pub async fn get_finance(&self, tenant_id: Uuid) -> Result<FinanceSummary, AppError> {
        let totals = self.repo.get_finance_totals(tenant_id).await?;

        Ok(FinanceSummary::build(
            totals.sales_today,
            totals.received,
            totals.pending,
            &totals.delivered_by_method,
        ))
    }
}
