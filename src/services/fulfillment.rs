// src/services/fulfillment.rs
//
// Retirada de pedido pelo entregador: atribuição única + baixa de estoque,
// tudo na mesma transação.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::{db_utils::finish_tx, error::AppError},
    db::{OrdersRepository, StockRepository},
    models::{
        manifest::{IgnoredSegment, Manifest},
        orders::Order,
        stock::StockLevels,
    },
};

/// O que a retirada deve fazer, decidido antes de qualquer escrita.
#[derive(Debug, PartialEq)]
pub enum PickupPlan {
    /// O pedido já é deste entregador: nada muda.
    AlreadyAssigned,
    /// Atribui o pedido e grava o estoque resultante.
    Withdraw {
        next_levels: StockLevels,
        stock_changed: bool,
        ignored: Vec<IgnoredSegment>,
    },
}

/// Decisão pura da retirada.
pub fn plan_pickup(
    order: &Order,
    courier: &str,
    stock: &StockLevels,
) -> Result<PickupPlan, AppError> {
    let courier = courier.trim();
    if courier.is_empty() {
        return Err(AppError::InvalidInput("Entregador sem nome de exibição".into()));
    }

    match order.assignee() {
        Some(current) if current == courier => return Ok(PickupPlan::AlreadyAssigned),
        Some(current) => {
            return Err(AppError::OrderAlreadyAssigned {
                assignee: current.to_string(),
            })
        }
        None => {}
    }

    let manifest = Manifest::parse(&order.manifest);
    let demand = manifest.stock_demand();
    let next_levels = stock.after_withdrawal(&demand)?;

    Ok(PickupPlan::Withdraw {
        next_levels,
        stock_changed: !demand.is_empty(),
        ignored: manifest.ignored(),
    })
}

#[derive(Debug)]
pub struct PickupOutcome {
    pub order: Order,
    pub already_assigned: bool,
    pub ignored: Vec<IgnoredSegment>,
}

#[derive(Clone)]
pub struct FulfillmentService {
    orders_repo: OrdersRepository,
    stock_repo: StockRepository,
    pool: PgPool,
}

impl FulfillmentService {
    pub fn new(orders_repo: OrdersRepository, stock_repo: StockRepository, pool: PgPool) -> Self {
        Self { orders_repo, stock_repo, pool }
    }

    pub async fn pickup(
        &self,
        tenant_id: Uuid,
        order_id: Uuid,
        courier: &str,
    ) -> Result<PickupOutcome, AppError> {
        let mut tx = self.pool.begin().await?;
        let result = self.pickup_locked(&mut tx, tenant_id, order_id, courier).await;
        let outcome = finish_tx(tx, result).await?;

        if outcome.already_assigned {
            tracing::info!("Pedido {} já estava com {}; estoque intocado.", order_id, courier);
        } else {
            tracing::info!("🚚 Pedido {} retirado por {}", order_id, courier);
        }
        if !outcome.ignored.is_empty() {
            tracing::warn!("Pedido {}: trechos ignorados no manifesto: {:?}", order_id, outcome.ignored);
        }
        Ok(outcome)
    }

    // Ordem dos locks é sempre pedido -> estoque, para não haver deadlock
    // entre duas retiradas concorrentes.
    async fn pickup_locked(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: Uuid,
        order_id: Uuid,
        courier: &str,
    ) -> Result<PickupOutcome, AppError> {
        let order = self.orders_repo
            .get_order_for_update(&mut **tx, tenant_id, order_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pedido".into()))?;

        let stock = self.stock_repo
            .get_stock_for_update(&mut **tx, tenant_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Estoque".into()))?;

        match plan_pickup(&order, courier, &stock.levels)? {
            PickupPlan::AlreadyAssigned => Ok(PickupOutcome {
                order,
                already_assigned: true,
                ignored: Vec::new(),
            }),
            PickupPlan::Withdraw { next_levels, stock_changed, ignored } => {
                if stock_changed {
                    self.stock_repo
                        .set_levels(&mut **tx, tenant_id, &next_levels)
                        .await?;
                }

                let order = self.orders_repo
                    .set_assignee(&mut **tx, tenant_id, order_id, courier.trim())
                    .await?;

                Ok(PickupOutcome {
                    order,
                    already_assigned: false,
                    ignored,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{manifest::IgnoreReason, stock::Sku};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn order(manifest: &str, assignee: Option<&str>) -> Order {
        Order {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            address: "Rua A, 1".into(),
            recipient: "Fernanda".into(),
            manifest: manifest.into(),
            payment_method: None,
            price: Decimal::ZERO,
            created_on: Utc::now().date_naive(),
            assigned_courier: assignee.map(Into::into),
            delivered: false,
            paid: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn stock() -> StockLevels {
        StockLevels { p45: 5, p20: 2, p13: 10, p8: 0, p5: 0, agua: 30 }
    }

    #[test]
    fn unassigned_order_decrements_every_sku() {
        let plan = plan_pickup(&order("agua:2, p45:1", None), "Carlos", &stock()).unwrap();

        let PickupPlan::Withdraw { next_levels, stock_changed, ignored } = plan else {
            panic!("esperava baixa de estoque");
        };
        assert!(stock_changed);
        assert!(ignored.is_empty());
        assert_eq!(next_levels.agua, 28);
        assert_eq!(next_levels.p45, 4);
        assert_eq!(next_levels.p13, 10);
    }

    #[test]
    fn same_courier_again_is_a_no_op() {
        let plan = plan_pickup(&order("agua:2", Some("Carlos")), " Carlos ", &stock()).unwrap();

        assert_eq!(plan, PickupPlan::AlreadyAssigned);
    }

    #[test]
    fn other_courier_gets_conflict_with_assignee() {
        let err = plan_pickup(&order("agua:2", Some("Ana")), "Carlos", &stock()).unwrap_err();

        assert!(matches!(err, AppError::OrderAlreadyAssigned { assignee } if assignee == "Ana"));
    }

    #[test]
    fn blank_assignee_counts_as_unassigned() {
        let plan = plan_pickup(&order("p13:1", Some("  ")), "Carlos", &stock()).unwrap();

        assert!(matches!(plan, PickupPlan::Withdraw { .. }));
    }

    #[test]
    fn insufficient_stock_blocks_whole_pickup() {
        let levels = StockLevels { p45: 1, ..StockLevels::default() };

        let err = plan_pickup(&order("p45:1, agua:1", None), "Carlos", &levels).unwrap_err();

        assert!(matches!(
            err,
            AppError::InsufficientStock { sku: Sku::Agua, available: 0, required: 1 }
        ));
    }

    #[test]
    fn oversized_quantity_fails_the_stock_check() {
        let err = plan_pickup(&order("p45:3000000000", None), "Carlos", &stock()).unwrap_err();

        assert!(matches!(
            err,
            AppError::InsufficientStock { sku: Sku::P45, available: 5, required: i32::MAX }
        ));
    }

    #[test]
    fn first_short_sku_follows_manifest_order() {
        let empty = StockLevels::default();

        let err = plan_pickup(&order("agua:1, p45:1", None), "Carlos", &empty).unwrap_err();

        assert!(matches!(err, AppError::InsufficientStock { sku: Sku::Agua, .. }));
    }

    #[test]
    fn unknown_skus_are_reported_and_do_not_block() {
        let plan = plan_pickup(&order("p99:3, agua:1, lixo", None), "Carlos", &stock()).unwrap();

        let PickupPlan::Withdraw { next_levels, ignored, .. } = plan else {
            panic!("esperava baixa de estoque");
        };
        assert_eq!(next_levels.agua, 29);
        let reasons: Vec<_> = ignored.iter().map(|i| i.reason).collect();
        assert_eq!(reasons, vec![IgnoreReason::MissingColon, IgnoreReason::UnknownSku]);
    }

    #[test]
    fn manifest_without_known_skus_assigns_without_touching_stock() {
        let plan = plan_pickup(&order("x:0", None), "Carlos", &stock()).unwrap();

        let PickupPlan::Withdraw { next_levels, stock_changed, .. } = plan else {
            panic!("esperava atribuição");
        };
        assert!(!stock_changed);
        assert_eq!(next_levels, stock());
    }

    #[test]
    fn courier_without_name_is_rejected() {
        assert!(matches!(
            plan_pickup(&order("agua:1", None), "   ", &stock()),
            Err(AppError::InvalidInput(_))
        ));
    }
}
