// src/models/stock.rs

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

/// Soma máxima de itens no estoque de um ambiente.
/// Precisa bater com a constraint `ck_stock_total_max` da migration.
pub const STOCK_CAPACITY: i32 = 250;

// --- Produtos controlados pelo estoque ---
// Cinco tamanhos de botijão de gás + galão de água.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Sku {
    P45,
    P20,
    P13,
    P8,
    P5,
    Agua,
}

impl Sku {
    pub const ALL: [Sku; 6] = [Sku::P45, Sku::P20, Sku::P13, Sku::P8, Sku::P5, Sku::Agua];

    pub fn as_str(self) -> &'static str {
        match self {
            Sku::P45 => "p45",
            Sku::P20 => "p20",
            Sku::P13 => "p13",
            Sku::P8 => "p8",
            Sku::P5 => "p5",
            Sku::Agua => "agua",
        }
    }

    /// Token já normalizado (minúsculo, sem espaços) -> Sku conhecido.
    pub fn from_token(token: &str) -> Option<Sku> {
        Sku::ALL.into_iter().find(|sku| sku.as_str() == token)
    }

    /// Tabela de preço unitário usada quando o pedido chega sem preço.
    pub fn unit_price(self) -> Decimal {
        match self {
            Sku::P45 => Decimal::from(400),
            Sku::P20 => Decimal::from(200),
            Sku::P13 => Decimal::from(130),
            Sku::P8 => Decimal::from(100),
            Sku::P5 => Decimal::from(90),
            Sku::Agua => Decimal::from(10),
        }
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Contadores do estoque ---
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StockLevels {
    #[schema(example = 40)]
    pub p45: i32,
    #[schema(example = 20)]
    pub p20: i32,
    #[schema(example = 13)]
    pub p13: i32,
    #[schema(example = 8)]
    pub p8: i32,
    #[schema(example = 5)]
    pub p5: i32,
    #[schema(example = 15)]
    pub agua: i32,
}

impl StockLevels {
    pub fn get(&self, sku: Sku) -> i32 {
        match sku {
            Sku::P45 => self.p45,
            Sku::P20 => self.p20,
            Sku::P13 => self.p13,
            Sku::P8 => self.p8,
            Sku::P5 => self.p5,
            Sku::Agua => self.agua,
        }
    }

    fn slot_mut(&mut self, sku: Sku) -> &mut i32 {
        match sku {
            Sku::P45 => &mut self.p45,
            Sku::P20 => &mut self.p20,
            Sku::P13 => &mut self.p13,
            Sku::P8 => &mut self.p8,
            Sku::P5 => &mut self.p5,
            Sku::Agua => &mut self.agua,
        }
    }

    pub fn total(&self) -> i64 {
        Sku::ALL.iter().map(|sku| i64::from(self.get(*sku))).sum()
    }

    /// Percentual ocupado (arredondado) em relação à capacidade.
    pub fn percent(&self, capacity: i32) -> i64 {
        if capacity <= 0 {
            return 0;
        }
        (self.total() as f64 / f64::from(capacity) * 100.0).round() as i64
    }

    /// Contadores não negativos e soma dentro da capacidade.
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(sku) = Sku::ALL.into_iter().find(|sku| self.get(*sku) < 0) {
            return Err(AppError::InvalidInput(format!(
                "Quantidade negativa para {}",
                sku
            )));
        }

        let total = self.total();
        if total > i64::from(STOCK_CAPACITY) {
            return Err(AppError::StockCapacityExceeded {
                total,
                capacity: STOCK_CAPACITY,
            });
        }
        Ok(())
    }

    /// Calcula o estoque após a baixa. Valida TODOS os itens antes de
    /// subtrair qualquer um: no primeiro item faltante (na ordem da
    /// demanda) devolve o erro e `self` continua intacto.
    pub fn after_withdrawal(&self, demand: &[(Sku, i32)]) -> Result<StockLevels, AppError> {
        for &(sku, required) in demand {
            let available = self.get(sku);
            if available < required {
                return Err(AppError::InsufficientStock {
                    sku,
                    available,
                    required,
                });
            }
        }

        let mut next = *self;
        for &(sku, required) in demand {
            *next.slot_mut(sku) -= required;
        }
        Ok(next)
    }
}

// --- Registro do banco (um por ambiente) ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub levels: StockLevels,
    pub updated_at: DateTime<Utc>,
}

// --- Resumo para o painel (gráfico de pizza + texto de status) ---
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    pub levels: StockLevels,
    #[schema(example = 101)]
    pub total: i64,
    #[schema(example = 250)]
    pub capacity: i32,
    #[schema(example = 40)]
    pub percent: i64,
    #[schema(example = "Estoque: 101 / 250 itens (40%)")]
    pub status_text: String,
}

impl StockSummary {
    pub fn from_levels(levels: StockLevels) -> Self {
        let total = levels.total();
        let percent = levels.percent(STOCK_CAPACITY);
        Self {
            levels,
            total,
            capacity: STOCK_CAPACITY,
            percent,
            status_text: format!(
                "Estoque: {} / {} itens ({}%)",
                total, STOCK_CAPACITY, percent
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(p45: i32, agua: i32) -> StockLevels {
        StockLevels {
            p45,
            agua,
            ..StockLevels::default()
        }
    }

    #[test]
    fn withdrawal_is_all_or_nothing() {
        let stock = levels(1, 0);
        let demand = [(Sku::P45, 1), (Sku::Agua, 1)];

        let err = stock.after_withdrawal(&demand).unwrap_err();

        match err {
            AppError::InsufficientStock {
                sku,
                available,
                required,
            } => {
                assert_eq!(sku, Sku::Agua);
                assert_eq!(available, 0);
                assert_eq!(required, 1);
            }
            other => panic!("erro inesperado: {other:?}"),
        }
        assert_eq!(stock, levels(1, 0));
    }

    #[test]
    fn withdrawal_subtracts_every_requested_counter() {
        let stock = StockLevels {
            p45: 40,
            p20: 20,
            p13: 13,
            p8: 8,
            p5: 5,
            agua: 15,
        };
        let demand = [(Sku::Agua, 2), (Sku::P45, 1), (Sku::P5, 5)];

        let next = stock.after_withdrawal(&demand).unwrap();

        assert_eq!(next.agua, 13);
        assert_eq!(next.p45, 39);
        assert_eq!(next.p5, 0);
        assert_eq!(next.p20, 20);
        assert_eq!(next.total(), stock.total() - 8);
    }

    #[test]
    fn capacity_is_enforced() {
        let mut stock = StockLevels::default();
        stock.p45 = STOCK_CAPACITY;
        assert!(stock.validate().is_ok());

        stock.agua = 1;
        assert!(matches!(
            stock.validate(),
            Err(AppError::StockCapacityExceeded { total: 251, .. })
        ));
    }

    #[test]
    fn negative_counters_are_rejected() {
        let stock = levels(-1, 0);
        assert!(matches!(stock.validate(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn summary_reports_rounded_percent() {
        let summary = StockSummary::from_levels(StockLevels {
            p45: 40,
            p20: 20,
            p13: 13,
            p8: 8,
            p5: 5,
            agua: 15,
        });

        assert_eq!(summary.total, 101);
        assert_eq!(summary.percent, 40);
        assert_eq!(summary.status_text, "Estoque: 101 / 250 itens (40%)");
    }

    #[test]
    fn sku_tokens_round_trip_through_display() {
        for sku in Sku::ALL {
            assert_eq!(Sku::from_token(&sku.to_string()), Some(sku));
        }
        assert_eq!(Sku::from_token("p99"), None);
    }

    #[test]
    fn first_short_sku_in_demand_order_is_reported() {
        let stock = StockLevels::default();

        let err = stock.after_withdrawal(&[(Sku::Agua, 1), (Sku::P45, 1)]).unwrap_err();

        assert!(matches!(err, AppError::InsufficientStock { sku: Sku::Agua, .. }));
    }

    #[test]
    fn counters_stay_valid_across_a_sequence_of_pickups() {
        let mut stock = StockLevels {
            p45: 40,
            p20: 20,
            p13: 13,
            p8: 8,
            p5: 5,
            agua: 15,
        };
        let pickups: [&[(Sku, i32)]; 7] = [
            &[(Sku::Agua, 10), (Sku::P45, 3)],
            &[(Sku::P5, 6)],
            &[(Sku::P5, 5), (Sku::P8, 8)],
            &[(Sku::Agua, 5), (Sku::P13, 14)],
            &[(Sku::P45, i32::MAX)],
            &[(Sku::Agua, 5), (Sku::P20, 20)],
            &[(Sku::Agua, 1)],
        ];

        let mut applied = 0;
        for demand in pickups {
            match stock.after_withdrawal(demand) {
                Ok(next) => {
                    stock = next;
                    applied += 1;
                }
                Err(AppError::InsufficientStock { .. }) => {}
                Err(other) => panic!("erro inesperado: {other:?}"),
            }
            assert!(stock.validate().is_ok(), "estoque inválido: {stock:?}");
        }

        assert_eq!(applied, 3);
        assert_eq!(stock, StockLevels { p45: 37, p20: 0, p13: 13, p8: 0, p5: 0, agua: 0 });
    }
}
