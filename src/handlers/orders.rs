// src/handlers/orders.rs

use std::str::FromStr;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{RequireRole, Staff},
        tenancy::TenantContext,
    },
    models::orders::{NewOrder, Order, OrderResponse, PaymentMethod, PickupResponse},
};

// ---
// Payload: CreateOrder
// ---
// Aceita tanto o formato "pronto" (address, recipient, manifest) quanto o
// formato do painel antigo (endereco/rua, destinatario/cliente, produtos[],
// pagamentos[]). Os dois nomes podem vir juntos: vale o primeiro preenchido.
// Tudo converge para um único NewOrder.

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ManifestItemPayload {
    #[serde(default)]
    #[schema(example = "p45")]
    pub name: Option<String>,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<i32>, example = 1)]
    pub quantity: Value,
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub quantidade: Value,
}

impl ManifestItemPayload {
    /// "nome:quantidade", ou None quando falta um dos dois.
    fn as_segment(&self) -> Option<String> {
        let name = first_non_blank([self.name.as_deref(), self.nome.as_deref()])?;
        let quantity = [&self.quantity, &self.quantidade]
            .into_iter()
            .map(|value| match value {
                Value::Number(n) => n.to_string(),
                Value::String(s) => s.trim().to_string(),
                _ => String::new(),
            })
            .find(|q| !q.is_empty())?;
        if quantity == "0" {
            return None;
        }
        Some(format!("{}:{}", name, quantity))
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateOrderPayload {
    #[schema(example = "Rua São João, 340")]
    pub address: Option<String>,
    pub endereco: Option<String>,
    pub rua: Option<String>,

    #[schema(example = "Fernanda")]
    pub recipient: Option<String>,
    pub destinatario: Option<String>,
    pub cliente: Option<String>,

    #[schema(example = "agua:2, p45:1")]
    pub manifest: Option<String>,
    pub produto: Option<String>,

    #[serde(default)]
    pub items: Vec<ManifestItemPayload>,
    #[serde(default)]
    pub produtos: Vec<ManifestItemPayload>,

    #[schema(example = "pix")]
    pub payment_method: Option<String>,
    pub metodo_pagamento: Option<String>,

    #[serde(default)]
    pub payment_methods: Vec<String>,
    #[serde(default)]
    pub pagamentos: Vec<String>,

    #[schema(value_type = Option<f64>, example = 420.0)]
    pub price: Option<Value>,
    #[schema(value_type = Option<f64>)]
    pub preco: Option<Value>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn first_non_blank<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    values.into_iter().find_map(non_blank)
}

// null e "" contam como ausentes
fn is_blank_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

impl CreateOrderPayload {
    /// Converte qualquer um dos formatos aceitos em um NewOrder canônico.
    pub fn normalize(self) -> Result<NewOrder, AppError> {
        let address = first_non_blank([
            self.address.as_deref(),
            self.endereco.as_deref(),
            self.rua.as_deref(),
        ]);
        let recipient = first_non_blank([
            self.recipient.as_deref(),
            self.destinatario.as_deref(),
            self.cliente.as_deref(),
        ]);
        let (Some(address), Some(recipient)) = (address, recipient) else {
            return Err(AppError::InvalidInput(
                "Campos obrigatórios ausentes: endereço e destinatário".into(),
            ));
        };

        let manifest = first_non_blank([self.manifest.as_deref(), self.produto.as_deref()])
            .or_else(|| {
                let segments: Vec<String> = self
                    .items
                    .iter()
                    .chain(&self.produtos)
                    .filter_map(|i| i.as_segment())
                    .collect();
                (!segments.is_empty()).then(|| segments.join(", "))
            });
        let Some(manifest) = manifest else {
            return Err(AppError::InvalidInput("Nenhum produto informado".into()));
        };

        let payment_method = match first_non_blank([
            self.payment_method.as_deref(),
            self.metodo_pagamento.as_deref(),
            self.payment_methods.first().map(String::as_str),
            self.pagamentos.first().map(String::as_str),
        ]) {
            Some(raw) => Some(PaymentMethod::parse(&raw).ok_or_else(|| {
                AppError::InvalidInput(format!("Forma de pagamento inválida: {}", raw))
            })?),
            None => None,
        };

        let price = match [self.price, self.preco]
            .into_iter()
            .flatten()
            .find(|value| !is_blank_value(value))
        {
            None => None,
            Some(Value::Number(n)) => Some(parse_price(&n.to_string())?),
            Some(Value::String(s)) => Some(parse_price(s.trim())?),
            Some(_) => return Err(AppError::InvalidInput("Preço inválido".into())),
        };

        Ok(NewOrder {
            address,
            recipient,
            manifest,
            payment_method,
            price,
        })
    }
}

fn parse_price(raw: &str) -> Result<Decimal, AppError> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| AppError::InvalidInput(format!("Preço inválido: {}", raw)))
}

// ---
// Handlers
// ---

// POST /api/orders
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido criado", body = OrderResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequireRole<Staff>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let new_order = payload.normalize().map_err(|e| e.to_api_error(&locale))?;

    let order = app_state
        .order_service
        .create_order(tenant.0, new_order)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(OrderResponse { ok: true, order })))
}

// POST /api/orders/{id}/pickup
#[utoipa::path(
    post,
    path = "/api/orders/{id}/pickup",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido atribuído e estoque baixado", body = PickupResponse),
        (status = 404, description = "Pedido ou estoque não encontrado"),
        (status = 409, description = "Pedido já atribuído a outro entregador"),
        (status = 422, description = "Estoque insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn pickup_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = app_state
        .fulfillment_service
        .pickup(tenant.0, order_id, &user.0.name)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let warning = outcome.already_assigned.then(|| {
        locale.text(
            "Entrega já atribuída a este usuário. Nenhuma nova baixa de estoque executada.",
            "Order already assigned to this user. No stock was withdrawn again.",
        )
    });

    Ok(Json(PickupResponse {
        ok: true,
        order: outcome.order,
        warning,
        ignored: outcome.ignored,
    }))
}

// POST /api/orders/{id}/confirm-delivery
#[utoipa::path(
    post,
    path = "/api/orders/{id}/confirm-delivery",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido marcado como entregue", body = OrderResponse),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn confirm_delivery(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .order_service
        .confirm_delivered(tenant.0, order_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(OrderResponse { ok: true, order }))
}

// POST /api/orders/{id}/confirm-payment
#[utoipa::path(
    post,
    path = "/api/orders/{id}/confirm-payment",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido marcado como pago", body = OrderResponse),
        (status = 404, description = "Pedido não encontrado"),
        (status = 412, description = "Pedido ainda não entregue")
    ),
    security(("api_jwt" = []))
)]
pub async fn confirm_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .order_service
        .confirm_paid(tenant.0, order_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(OrderResponse { ok: true, order }))
}

// --- Listagens ---

#[utoipa::path(
    get,
    path = "/api/orders/pending",
    tag = "Orders",
    responses((status = 200, description = "Pedidos sem entregador e não entregues", body = Vec<Order>)),
    security(("api_jwt" = []))
)]
pub async fn list_pending(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let orders = app_state
        .order_service
        .list_pending(tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(orders))
}

#[utoipa::path(
    get,
    path = "/api/orders/current",
    tag = "Orders",
    responses((status = 200, description = "Entregas em andamento do usuário", body = Vec<Order>)),
    security(("api_jwt" = []))
)]
pub async fn list_current(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let orders = app_state
        .order_service
        .list_current(tenant.0, &user.0.name)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(orders))
}

#[utoipa::path(
    get,
    path = "/api/orders/history",
    tag = "Orders",
    responses((status = 200, description = "Pedidos entregues e pagos", body = Vec<Order>)),
    security(("api_jwt" = []))
)]
pub async fn list_history(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let orders = app_state
        .order_service
        .list_history(tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(orders))
}

#[utoipa::path(
    get,
    path = "/api/orders/awaiting-payment",
    tag = "Orders",
    responses((status = 200, description = "Pedidos entregues aguardando pagamento", body = Vec<Order>)),
    security(("api_jwt" = []))
)]
pub async fn list_awaiting_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let orders = app_state
        .order_service
        .list_awaiting_payment(tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(orders))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(body: Value) -> CreateOrderPayload {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn canonical_payload_passes_through() {
        let order = payload(json!({
            "address": " Rua São João, 340 ",
            "recipient": "Fernanda",
            "manifest": "agua:2, p45:1",
            "payment_method": "pix",
            "price": 420
        }))
        .normalize()
        .unwrap();

        assert_eq!(order.address, "Rua São João, 340");
        assert_eq!(order.manifest, "agua:2, p45:1");
        assert_eq!(order.payment_method, Some(PaymentMethod::Pix));
        assert_eq!(order.price, Some(Decimal::from(420)));
    }

    #[test]
    fn legacy_panel_payload_is_normalized() {
        let order = payload(json!({
            "rua": "Rua das Flores, 123",
            "cliente": "João",
            "produtos": [
                {"nome": "p13", "quantidade": 1},
                {"nome": "agua", "quantidade": "2"},
                {"nome": "", "quantidade": 5}
            ],
            "pagamentos": ["a_prazo", "pix"],
            "preco": ""
        }))
        .normalize()
        .unwrap();

        assert_eq!(order.recipient, "João");
        assert_eq!(order.manifest, "p13:1, agua:2");
        assert_eq!(order.payment_method, Some(PaymentMethod::Deferred));
        assert_eq!(order.price, None);
    }

    #[test]
    fn string_price_is_accepted() {
        let order = payload(json!({
            "endereco": "Rua A", "destinatario": "B", "produto": "p5:1", "preco": "90.50"
        }))
        .normalize()
        .unwrap();

        assert_eq!(order.price, Some(Decimal::new(9050, 2)));
        assert_eq!(order.payment_method, None);
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        let no_recipient = payload(json!({"endereco": "Rua A", "produto": "p5:1"}));
        assert!(matches!(no_recipient.normalize(), Err(AppError::InvalidInput(_))));

        let no_products = payload(json!({"endereco": "Rua A", "destinatario": "B", "produtos": []}));
        assert!(matches!(no_products.normalize(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn unknown_payment_method_is_rejected() {
        let body = payload(json!({
            "endereco": "Rua A", "destinatario": "B", "produto": "p5:1", "metodo_pagamento": "cheque"
        }));

        assert!(matches!(body.normalize(), Err(AppError::InvalidInput(msg)) if msg.contains("cheque")));
    }

    #[test]
    fn canonical_and_legacy_keys_together_use_the_first_filled() {
        let order = payload(json!({
            "endereco": "Rua A, 1",
            "rua": "Rua B, 2",
            "address": "",
            "cliente": "Fernanda",
            "destinatario": "  ",
            "produtos": [{"name": "p13", "nome": "p45", "quantity": null, "quantidade": 2}],
            "preco": "15.50",
            "price": null
        }))
        .normalize()
        .unwrap();

        assert_eq!(order.address, "Rua A, 1");
        assert_eq!(order.recipient, "Fernanda");
        assert_eq!(order.manifest, "p13:2");
        assert_eq!(order.price, Some(Decimal::new(1550, 2)));
    }
}
