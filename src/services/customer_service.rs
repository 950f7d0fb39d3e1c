// src/services/customer_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CustomerRepository,
    models::customers::Customer,
};

#[derive(Clone)]
pub struct CustomerService {
    repo: CustomerRepository,
    pool: PgPool,
}

impl CustomerService {
    pub fn new(repo: CustomerRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn create_customer(&self, tenant_id: Uuid, address: &str) -> Result<Customer, AppError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(AppError::InvalidInput("Informe o endereço do cliente".into()));
        }

        self.repo.create_customer(&self.pool, tenant_id, address).await
    }

    pub async fn list_customers(&self, tenant_id: Uuid) -> Result<Vec<Customer>, AppError> {
        self.repo.list_customers(tenant_id).await
    }
}
