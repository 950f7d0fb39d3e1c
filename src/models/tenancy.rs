// src/models/tenancy.rs

use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::stock::StockRecord;

// ---
// Tenant (o "Ambiente")
// ---
// Fronteira de isolamento: estoque, pedidos, clientes, usuários e temas.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    #[schema(example = "Ultra Gás Centro")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// Ambiente recém-criado junto com o seu estoque inicial
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionedTenant {
    pub tenant: Tenant,
    pub stock: StockRecord,
}
