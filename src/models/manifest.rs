// src/models/manifest.rs
//
// O "manifesto" é a string compacta de produtos de uma entrega,
// ex.: "agua:2, p45:1".

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::stock::Sku;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IgnoreReason {
    MissingColon,
    EmptySku,
    InvalidQuantity,
    NonPositiveQuantity,
    UnknownSku,
}

/// Trecho do manifesto que não entrou na baixa de estoque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IgnoredSegment {
    #[schema(example = "p99:1")]
    pub segment: String,
    pub reason: IgnoreReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    // Ordem da primeira aparição de cada produto no manifesto
    quantities: Vec<(String, i32)>,
    ignored: Vec<IgnoredSegment>,
}

/// Inteiro com sinal opcional. Valores fora de `i64` saturam em vez de
/// virarem "quantidade inválida".
fn parse_quantity(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(q) = raw.parse::<i64>() {
        return Some(q);
    }

    let digits = raw.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if raw.starts_with('-') { i64::MIN } else { i64::MAX })
}

impl Manifest {
    /// Interpreta o manifesto. Nunca falha: trechos vazios somem, trechos
    /// malformados vão para `ignored`, e repetições do mesmo produto somam.
    /// Quantidades acima de `i32::MAX` ficam em `i32::MAX`.
    pub fn parse(raw: &str) -> Self {
        let mut manifest = Manifest::default();

        for part in raw.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let Some((sku, qty)) = part.split_once(':') else {
                manifest.ignore(part, IgnoreReason::MissingColon);
                continue;
            };

            let sku = sku.trim().to_lowercase();
            if sku.is_empty() {
                manifest.ignore(part, IgnoreReason::EmptySku);
                continue;
            }

            let qty = match parse_quantity(qty) {
                Some(q) if q > 0 => i32::try_from(q).unwrap_or(i32::MAX),
                Some(_) => {
                    manifest.ignore(part, IgnoreReason::NonPositiveQuantity);
                    continue;
                }
                None => {
                    manifest.ignore(part, IgnoreReason::InvalidQuantity);
                    continue;
                }
            };

            match manifest.quantities.iter_mut().find(|(token, _)| *token == sku) {
                Some((_, total)) => *total = total.saturating_add(qty),
                None => manifest.quantities.push((sku, qty)),
            }
        }

        manifest
    }

    fn ignore(&mut self, segment: &str, reason: IgnoreReason) {
        self.ignored.push(IgnoredSegment {
            segment: segment.to_string(),
            reason,
        });
    }

    pub fn quantities(&self) -> &[(String, i32)] {
        &self.quantities
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Quantidade por produto controlado, na ordem do manifesto.
    /// Produtos desconhecidos ficam de fora.
    pub fn stock_demand(&self) -> Vec<(Sku, i32)> {
        self.quantities
            .iter()
            .filter_map(|(token, qty)| Sku::from_token(token).map(|sku| (sku, *qty)))
            .collect()
    }

    /// Primeiro os trechos malformados, depois os produtos desconhecidos
    /// (cada grupo na ordem do manifesto).
    pub fn ignored(&self) -> Vec<IgnoredSegment> {
        let mut ignored = self.ignored.clone();
        ignored.extend(
            self.quantities
                .iter()
                .filter(|(token, _)| Sku::from_token(token).is_none())
                .map(|(token, qty)| IgnoredSegment {
                    segment: format!("{}:{}", token, qty),
                    reason: IgnoreReason::UnknownSku,
                }),
        );
        ignored
    }

    /// Preço pela tabela unitária; produtos desconhecidos valem zero.
    pub fn estimated_price(&self) -> Decimal {
        self.stock_demand()
            .into_iter()
            .map(|(sku, qty)| sku.unit_price() * Decimal::from(qty))
            .sum()
    }
}
