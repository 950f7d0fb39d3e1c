// src/models/dashboard.rs

use serde::Serialize;
use rust_decimal::Decimal;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::orders::PaymentMethod;

// 1. Cards do topo do painel
#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCards {
    pub pending_orders: i64,          // Sem entregador e não entregues
    pub orders_today: i64,            // Criados hoje
    pub couriers_on_route: i64,       // Entregadores distintos com entrega em aberto
    pub stock_percent: i64,           // Ocupação do estoque
    pub my_current_deliveries: i64,   // Do usuário logado, ainda não entregues
    pub my_completed_deliveries: i64, // Do usuário logado, já entregues
}

// 2. Contagem de entregas realizadas por forma de pagamento (linha do banco)
#[derive(Debug, FromRow)]
pub struct PaymentMethodCountRow {
    pub payment_method: PaymentMethod,
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodCount {
    pub payment_method: PaymentMethod,
    #[schema(example = "Pix")]
    pub label: String,
    pub delivered_orders: i64,
}

// 3. Valores financeiros
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSummary {
    pub sales_today: Decimal, // Pedidos criados hoje (pagos ou não)
    pub received: Decimal,    // Pedidos pagos
    pub pending: Decimal,     // Pedidos ainda não pagos
    pub delivered_by_payment_method: Vec<PaymentMethodCount>,
}

impl FinanceSummary {
    /// Monta o gráfico na ordem fixa das formas de pagamento, com zero nas ausentes.
    pub fn build(
        sales_today: Decimal,
        received: Decimal,
        pending: Decimal,
        rows: &[PaymentMethodCountRow],
    ) -> Self {
        let delivered_by_payment_method = PaymentMethod::ALL
            .into_iter()
            .map(|method| PaymentMethodCount {
                payment_method: method,
                label: method.label().to_string(),
                delivered_orders: rows
                    .iter()
                    .filter(|row| row.payment_method == method)
                    .map(|row| row.total)
                    .sum(),
            })
            .collect();

        Self {
            sales_today,
            received,
            pending,
            delivered_by_payment_method,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finance_chart_keeps_fixed_order_and_fills_gaps() {
        let rows = vec![
            PaymentMethodCountRow { payment_method: PaymentMethod::Cash, total: 4 },
            PaymentMethodCountRow { payment_method: PaymentMethod::Pix, total: 2 },
        ];

        let summary = FinanceSummary::build(Decimal::from(130), Decimal::ZERO, Decimal::from(420), &rows);

        let counts: Vec<_> = summary
            .delivered_by_payment_method
            .iter()
            .map(|c| (c.payment_method, c.delivered_orders))
            .collect();
        assert_eq!(
            counts,
            vec![
                (PaymentMethod::Deferred, 0),
                (PaymentMethod::Pix, 2),
                (PaymentMethod::Card, 0),
                (PaymentMethod::Cash, 4),
            ]
        );
        assert_eq!(summary.delivered_by_payment_method[0].label, "A prazo");
    }
}
