// src/models/orders.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::manifest::IgnoredSegment;

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Pix,
    #[serde(alias = "a_prazo")]
    Deferred,
    #[serde(alias = "cartao")]
    Card,
    #[serde(alias = "dinheiro")]
    Cash,
}

impl PaymentMethod {
    // Ordem fixa usada no gráfico financeiro
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Deferred,
        PaymentMethod::Pix,
        PaymentMethod::Card,
        PaymentMethod::Cash,
    ];

    /// Aceita os nomes em inglês e os nomes usados pelo painel antigo.
    pub fn parse(raw: &str) -> Option<PaymentMethod> {
        match raw.trim().to_lowercase().as_str() {
            "pix" => Some(PaymentMethod::Pix),
            "deferred" | "a_prazo" => Some(PaymentMethod::Deferred),
            "card" | "cartao" => Some(PaymentMethod::Card),
            "cash" | "dinheiro" => Some(PaymentMethod::Cash),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Pix => "Pix",
            PaymentMethod::Deferred => "A prazo",
            PaymentMethod::Card => "Cartão",
            PaymentMethod::Cash => "Dinheiro",
        }
    }
}

// --- Entrega / Pedido ---
// Ciclo de vida: criado -> atribuído (retirada) -> entregue -> pago.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Rua São João, 340")]
    pub address: String,
    #[schema(example = "Fernanda")]
    pub recipient: String,
    #[schema(example = "agua:2, p45:1")]
    pub manifest: String,
    pub payment_method: Option<PaymentMethod>,
    #[schema(example = "420.00")]
    pub price: Decimal,
    pub created_on: NaiveDate,
    #[schema(example = "Carlos")]
    pub assigned_courier: Option<String>,
    pub delivered: bool,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Entregador responsável. Vazio conta como "sem responsável".
    pub fn assignee(&self) -> Option<&str> {
        self.assigned_courier
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Entrada canônica para criar um pedido, já normalizada pelo handler.
/// Os limites são os tamanhos das colunas da tabela `orders`.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewOrder {
    #[validate(length(max = 255, message = "O endereço deve ter no máximo 255 caracteres."))]
    pub address: String,
    #[validate(length(max = 120, message = "O destinatário deve ter no máximo 120 caracteres."))]
    pub recipient: String,
    #[validate(length(max = 255, message = "O manifesto deve ter no máximo 255 caracteres."))]
    pub manifest: String,
    pub payment_method: Option<PaymentMethod>,
    pub price: Option<Decimal>,
}

// --- Respostas ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub ok: bool,
    pub order: Order,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PickupResponse {
    pub ok: bool,
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Entrega já atribuída a este usuário. Nenhuma nova baixa de estoque executada.")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored: Vec<IgnoredSegment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_method_accepts_portuguese_aliases() {
        assert_eq!(PaymentMethod::parse("a_prazo"), Some(PaymentMethod::Deferred));
        assert_eq!(PaymentMethod::parse(" Cartao "), Some(PaymentMethod::Card));
        assert_eq!(PaymentMethod::parse("dinheiro"), Some(PaymentMethod::Cash));
        assert_eq!(PaymentMethod::parse("pix"), Some(PaymentMethod::Pix));
        assert_eq!(PaymentMethod::parse("cheque"), None);
    }

    #[test]
    fn payment_method_serde_uses_english_names() {
        let json = serde_json::to_string(&PaymentMethod::Deferred).unwrap();
        assert_eq!(json, "\"deferred\"");

        let parsed: PaymentMethod = serde_json::from_str("\"dinheiro\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Cash);
    }
}
