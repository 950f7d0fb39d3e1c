// src/db/orders_repo.rs

use sqlx::{PgPool, Postgres, Executor};
use uuid::Uuid;
use rust_decimal::Decimal;
use crate::{
    common::error::AppError,
    models::orders::{NewOrder, Order},
};

#[derive(Clone)]
pub struct OrdersRepository {
    pool: PgPool,
}

impl OrdersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    pub async fn create_order<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        new_order: &NewOrder,
        price: Decimal,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (tenant_id, address, recipient, manifest, payment_method, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
            .bind(tenant_id)
            .bind(&new_order.address)
            .bind(&new_order.recipient)
            .bind(&new_order.manifest)
            .bind(new_order.payment_method)
            .bind(price)
            .fetch_one(executor)
            .await?;

        Ok(order)
    }

    /// Lê o pedido travando a linha até o fim da transação.
    pub async fn get_order_for_update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        order_id: Uuid,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE id = $1 AND tenant_id = $2 FOR UPDATE",
        )
            .bind(order_id)
            .bind(tenant_id)
            .fetch_optional(executor)
            .await?;

        Ok(order)
    }

    pub async fn set_assignee<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        order_id: Uuid,
        courier: &str,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET assigned_courier = $3, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
            .bind(order_id)
            .bind(tenant_id)
            .bind(courier)
            .fetch_one(executor)
            .await?;

        Ok(order)
    }

    /// Retorna None quando o pedido não existe no ambiente.
    pub async fn mark_delivered<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        order_id: Uuid,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET delivered = TRUE, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
            .bind(order_id)
            .bind(tenant_id)
            .fetch_optional(executor)
            .await?;

        Ok(order)
    }

    pub async fn mark_paid<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        order_id: Uuid,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET paid = TRUE, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
            .bind(order_id)
            .bind(tenant_id)
            .fetch_one(executor)
            .await?;

        Ok(order)
    }

    // =========================================================================
    //  LISTAGENS
    // =========================================================================

    /// Sem entregador e ainda não entregues.
    pub async fn list_pending(&self, tenant_id: Uuid) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE tenant_id = $1
              AND COALESCE(TRIM(assigned_courier), '') = ''
              AND delivered = FALSE
            ORDER BY created_at ASC
            "#,
        )
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Entregas em andamento do entregador.
    pub async fn list_current_for_courier(
        &self,
        tenant_id: Uuid,
        courier: &str,
    ) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE tenant_id = $1 AND assigned_courier = $2 AND delivered = FALSE
            ORDER BY created_at ASC
            "#,
        )
            .bind(tenant_id)
            .bind(courier)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    pub async fn list_history(&self, tenant_id: Uuid) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE tenant_id = $1 AND delivered = TRUE AND paid = TRUE
            ORDER BY updated_at DESC
            "#,
        )
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    pub async fn list_awaiting_payment(&self, tenant_id: Uuid) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE tenant_id = $1 AND delivered = TRUE AND paid = FALSE
            ORDER BY updated_at DESC
            "#,
        )
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }
}
