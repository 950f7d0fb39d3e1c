// src/db/stock_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::stock::{StockLevels, StockRecord},
};

#[derive(Clone)]
pub struct StockRepository {
    pool: PgPool,
}

impl StockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    pub async fn get_stock(&self, tenant_id: Uuid) -> Result<Option<StockRecord>, AppError> {
        let stock = sqlx::query_as::<_, StockRecord>("SELECT * FROM stock WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(stock)
    }

    /// Mesma leitura, mas trava a linha até o fim da transação.
    /// Duas retiradas simultâneas no mesmo ambiente passam a ser serializadas.
    pub async fn get_stock_for_update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Option<StockRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stock = sqlx::query_as::<_, StockRecord>(
            "SELECT * FROM stock WHERE tenant_id = $1 FOR UPDATE",
        )
            .bind(tenant_id)
            .fetch_optional(executor)
            .await?;
        Ok(stock)
    }

    // ---
    // Escrita (Transacional)
    // ---

    /// Cria o registro de estoque do ambiente (feito no provisionamento).
    pub async fn create_stock<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        levels: &StockLevels,
    ) -> Result<StockRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stock = sqlx::query_as::<_, StockRecord>(
            r#"
            INSERT INTO stock (tenant_id, p45, p20, p13, p8, p5, agua)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
            .bind(tenant_id)
            .bind(levels.p45)
            .bind(levels.p20)
            .bind(levels.p13)
            .bind(levels.p8)
            .bind(levels.p5)
            .bind(levels.agua)
            .fetch_one(executor)
            .await?;
        Ok(stock)
    }

    /// Grava os novos contadores (já validados pelo service).
    pub async fn set_levels<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        levels: &StockLevels,
    ) -> Result<StockRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stock = sqlx::query_as::<_, StockRecord>(
            r#"
            UPDATE stock
            SET p45 = $2, p20 = $3, p13 = $4, p8 = $5, p5 = $6, agua = $7,
                updated_at = NOW()
            WHERE tenant_id = $1
            RETURNING *
            "#,
        )
            .bind(tenant_id)
            .bind(levels.p45)
            .bind(levels.p20)
            .bind(levels.p13)
            .bind(levels.p8)
            .bind(levels.p5)
            .bind(levels.agua)
            .fetch_one(executor)
            .await?;
        Ok(stock)
    }
}
