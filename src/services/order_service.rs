// src/services/order_service.rs

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;
use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    common::{db_utils::finish_tx, error::AppError},
    db::OrdersRepository,
    models::{
        manifest::Manifest,
        orders::{NewOrder, Order},
    },
};

#[derive(Clone)]
pub struct OrderService {
    orders_repo: OrdersRepository,
    pool: PgPool,
}

/// Regras do pedido novo: campos obrigatórios e dentro do tamanho das
/// colunas, manifesto com ao menos um item legível e preço nunca negativo. Sem preço => tabela unitária.
pub fn validate_new_order(new_order: &NewOrder) -> Result<Decimal, AppError> {
    if new_order.address.trim().is_empty() {
        return Err(AppError::InvalidInput("Informe o endereço".into()));
    }
    if new_order.recipient.trim().is_empty() {
        return Err(AppError::InvalidInput("Informe o destinatário".into()));
    }
    new_order.validate()?;

    let manifest = Manifest::parse(&new_order.manifest);
    if manifest.is_empty() {
        return Err(AppError::InvalidInput("Informe ao menos um produto".into()));
    }

    match new_order.price {
        Some(price) if price < Decimal::ZERO => {
            Err(AppError::InvalidInput("O preço não pode ser negativo".into()))
        }
        Some(price) => Ok(price),
        None => Ok(manifest.estimated_price()),
    }
}

/// Pagamento só depois da entrega.
pub fn ensure_payable(order: &Order) -> Result<(), AppError> {
    if order.delivered {
        Ok(())
    } else {
        Err(AppError::OrderNotDelivered)
    }
}

impl OrderService {
    pub fn new(orders_repo: OrdersRepository, pool: PgPool) -> Self {
        Self { orders_repo, pool }
    }

    pub async fn create_order(&self, tenant_id: Uuid, new_order: NewOrder) -> Result<Order, AppError> {
        let price = validate_new_order(&new_order)?;

        let order = self.orders_repo
            .create_order(&self.pool, tenant_id, &new_order, price)
            .await?;

        tracing::info!("📦 Pedido {} criado para {}", order.id, order.recipient);
        Ok(order)
    }

    /// Marca como entregue. Idempotente, inclusive para pedidos já pagos.
    pub async fn confirm_delivered(&self, tenant_id: Uuid, order_id: Uuid) -> Result<Order, AppError> {
        let order = self.orders_repo
            .mark_delivered(&self.pool, tenant_id, order_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pedido".into()))?;

        tracing::info!("✅ Pedido {} entregue", order.id);
        Ok(order)
    }

    pub async fn confirm_paid(&self, tenant_id: Uuid, order_id: Uuid) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;
        let result = self.confirm_paid_locked(&mut tx, tenant_id, order_id).await;
        let order = finish_tx(tx, result).await?;

        tracing::info!("💰 Pedido {} pago", order.id);
        Ok(order)
    }

    async fn confirm_paid_locked(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: Uuid,
        order_id: Uuid,
    ) -> Result<Order, AppError> {
        let order = self.orders_repo
            .get_order_for_update(&mut **tx, tenant_id, order_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pedido".into()))?;

        ensure_payable(&order)?;
        if order.paid {
            return Ok(order);
        }

        self.orders_repo.mark_paid(&mut **tx, tenant_id, order_id).await
    }

    // --- Listagens ---

    pub async fn list_pending(&self, tenant_id: Uuid) -> Result<Vec<Order>, AppError> {
        self.orders_repo.list_pending(tenant_id).await
    }

    pub async fn list_current(&self, tenant_id: Uuid, courier: &str) -> Result<Vec<Order>, AppError> {
        self.orders_repo.list_current_for_courier(tenant_id, courier.trim()).await
    }

    pub async fn list_history(&self, tenant_id: Uuid) -> Result<Vec<Order>, AppError> {
        self.orders_repo.list_history(tenant_id).await
    }

    pub async fn list_awaiting_payment(&self, tenant_id: Uuid) -> Result<Vec<Order>, AppError> {
        self.orders_repo.list_awaiting_payment(tenant_id).await
    }
}
