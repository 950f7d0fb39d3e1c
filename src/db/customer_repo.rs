// src/db/customer_repo.rs

use sqlx::{PgPool, Postgres, Executor};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::customers::Customer,
};

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_customer<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        address: &str,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (tenant_id, address)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
            .bind(tenant_id)
            .bind(address)
            .fetch_one(executor)
            .await?;

        Ok(customer)
    }

    /// Lista os clientes do ambiente (mais recentes primeiro).
    pub async fn list_customers(&self, tenant_id: Uuid) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE tenant_id = $1 ORDER BY created_at DESC",
        )
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }
}
