// src/db/dashboard_repo.rs

use sqlx::PgPool;
use uuid::Uuid;
use rust_decimal::Decimal;
use crate::{
    common::error::AppError,
    models::dashboard::PaymentMethodCountRow,
};

/// Contagens dos cards (sem o percentual de estoque, que vem do StockRepository).
#[derive(Debug, Default)]
pub struct OrderCounts {
    pub pending_orders: i64,
    pub orders_today: i64,
    pub couriers_on_route: i64,
    pub my_current_deliveries: i64,
    pub my_completed_deliveries: i64,
}

#[derive(Debug, Default)]
pub struct FinanceTotals {
    pub sales_today: Decimal,
    pub received: Decimal,
    pub pending: Decimal,
    pub delivered_by_method: Vec<PaymentMethodCountRow>,
}

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // 1. Cards
    pub async fn get_order_counts(
        &self,
        tenant_id: Uuid,
        courier: &str,
    ) -> Result<OrderCounts, AppError> {
        // Transação só de leitura: todos os números vêm do mesmo snapshot
        let mut tx = self.pool.begin().await?;

        let pending_orders: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM orders
            WHERE tenant_id = $1
              AND COALESCE(TRIM(assigned_courier), '') = ''
              AND delivered = FALSE
            "#,
        )
            .bind(tenant_id)
            .fetch_one(&mut *tx)
            .await?;

        let orders_today: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE tenant_id = $1 AND created_on = CURRENT_DATE",
        )
            .bind(tenant_id)
            .fetch_one(&mut *tx)
            .await?;

        let couriers_on_route: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT assigned_courier) FROM orders
            WHERE tenant_id = $1
              AND COALESCE(TRIM(assigned_courier), '') <> ''
              AND delivered = FALSE
            "#,
        )
            .bind(tenant_id)
            .fetch_one(&mut *tx)
            .await?;

        let (my_current_deliveries, my_completed_deliveries): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE delivered = FALSE),
                COUNT(*) FILTER (WHERE delivered = TRUE)
            FROM orders
            WHERE tenant_id = $1 AND assigned_courier = $2
            "#,
        )
            .bind(tenant_id)
            .bind(courier)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(OrderCounts {
            pending_orders,
            orders_today,
            couriers_on_route,
            my_current_deliveries,
            my_completed_deliveries,
        })
    }

    // 2. Financeiro
    pub async fn get_finance_totals(&self, tenant_id: Uuid) -> Result<FinanceTotals, AppError> {
        let mut tx = self.pool.begin().await?;

        // Vendas do dia: tudo que foi criado hoje, pago ou não.
        // Recebido: pedidos pagos. Pendente: ainda não pagos.
        let (sales_today, received, pending): (Decimal, Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(price) FILTER (WHERE created_on = CURRENT_DATE), 0),
                COALESCE(SUM(price) FILTER (WHERE paid = TRUE), 0),
                COALESCE(SUM(price) FILTER (WHERE paid = FALSE), 0)
            FROM orders
            WHERE tenant_id = $1
            "#,
        )
            .bind(tenant_id)
            .fetch_one(&mut *tx)
            .await?;

        let delivered_by_method = sqlx::query_as::<_, PaymentMethodCountRow>(
            r#"
            SELECT payment_method, COUNT(*) AS total
            FROM orders
            WHERE tenant_id = $1 AND delivered = TRUE AND payment_method IS NOT NULL
            GROUP BY payment_method
            "#,
        )
            .bind(tenant_id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(FinanceTotals {
            sales_today,
            received,
            pending,
            delivered_by_method,
        })
    }
}
