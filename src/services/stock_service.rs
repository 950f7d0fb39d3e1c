// src/services/stock_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::StockRepository,
    models::stock::StockSummary,
};

#[derive(Clone)]
pub struct StockService {
    repo: StockRepository,
}

impl StockService {
    pub fn new(repo: StockRepository) -> Self {
        Self { repo }
    }

    /// Contadores + ocupação do estoque do ambiente.
    pub async fn get_summary(&self, tenant_id: Uuid) -> Result<StockSummary, AppError> {
        let stock = self.repo
            .get_stock(tenant_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Estoque".into()))?;

        Ok(StockSummary::from_levels(stock.levels))
    }
}
