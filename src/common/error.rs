// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{middleware::i18n::Locale, models::stock::Sku};

// Nosso tipo de erro de domínio. Os services só conhecem este tipo;
// a tradução para HTTP acontece em `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Entrada inválida: {0}")]
    InvalidInput(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Ambiente '{0}' já existe")]
    TenantNameAlreadyExists(String),

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Entrega já atribuída a '{assignee}'")]
    OrderAlreadyAssigned { assignee: String },

    #[error("Estoque insuficiente para {sku}: disponível {available}, necessário {required}")]
    InsufficientStock {
        sku: Sku,
        available: i32,
        required: i32,
    },

    #[error("Entrega ainda não marcada como entregue")]
    OrderNotDelivered,

    #[error("Capacidade do estoque excedida: {total} / {capacity}")]
    StockCapacityExceeded { total: i64, capacity: i32 },

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // `anyhow::Error` carrega o contexto de falhas inesperadas.
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O erro "pronto para o cliente": status + mensagem traduzida + detalhes opcionais.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists
            | AppError::TenantNameAlreadyExists(_)
            | AppError::OrderAlreadyAssigned { .. } => StatusCode::CONFLICT,
            AppError::InsufficientStock { .. } | AppError::StockCapacityExceeded { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::OrderNotDelivered => StatusCode::PRECONDITION_FAILED,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro de domínio na resposta da API, no idioma do cliente.
    pub fn to_api_error(self, locale: &Locale) -> ApiError {
        let status = self.status();

        let (error, details) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::BTreeMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => e.code.to_string(),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                (
                    locale.text(
                        "Um ou mais campos são inválidos.",
                        "One or more fields are invalid.",
                    ),
                    Some(json!(details)),
                )
            }
            AppError::InvalidInput(message) => (message, None),
            AppError::InvalidCredentials => (
                locale.text("E-mail ou senha inválidos.", "Invalid e-mail or password."),
                None,
            ),
            AppError::InvalidToken => (
                locale.text(
                    "Token de autenticação inválido ou ausente.",
                    "Missing or invalid authentication token.",
                ),
                None,
            ),
            AppError::Forbidden => (
                locale.text(
                    "Você não tem permissão para realizar esta ação.",
                    "You are not allowed to perform this action.",
                ),
                None,
            ),
            AppError::EmailAlreadyExists => (
                locale.text("Este e-mail já está em uso.", "This e-mail is already in use."),
                None,
            ),
            AppError::TenantNameAlreadyExists(name) => (
                locale.text(
                    &format!("Já existe um ambiente chamado '{}'.", name),
                    &format!("An environment named '{}' already exists.", name),
                ),
                None,
            ),
            AppError::ResourceNotFound(what) => (
                locale.text(
                    &format!("{} não encontrado(a).", what),
                    &format!("{} not found.", what),
                ),
                None,
            ),
            AppError::OrderAlreadyAssigned { assignee } => (
                locale.text("Entrega já atribuída.", "Order already assigned."),
                Some(json!({ "assignee": assignee })),
            ),
            AppError::InsufficientStock {
                sku,
                available,
                required,
            } => (
                locale.text(
                    &format!(
                        "Estoque insuficiente para {}. Disponível: {}, necessário: {}",
                        sku, available, required
                    ),
                    &format!(
                        "Insufficient stock for {}. Available: {}, required: {}",
                        sku, available, required
                    ),
                ),
                Some(json!({ "sku": sku, "available": available, "required": required })),
            ),
            AppError::OrderNotDelivered => (
                locale.text(
                    "Entrega ainda não marcada como entregue.",
                    "Order has not been marked as delivered yet.",
                ),
                None,
            ),
            AppError::StockCapacityExceeded { total, capacity } => (
                locale.text(
                    &format!("O estoque ({}) excede a capacidade de {} itens.", total, capacity),
                    &format!("Stock ({}) exceeds the capacity of {} items.", total, capacity),
                ),
                Some(json!({ "total": total, "capacity": capacity })),
            ),

            // Todos os outros erros viram 500. O detalhe fica no log, nunca na resposta.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    locale.text("Ocorreu um erro inesperado.", "An unexpected error occurred."),
                    None,
                )
            }
        };

        ApiError {
            status,
            error,
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct SignupForm {
        #[validate(length(min = 1, message = "obrigatório"))]
        name: String,
    }

    #[test]
    fn insufficient_stock_carries_sku_and_amounts() {
        let err = AppError::InsufficientStock {
            sku: Sku::Agua,
            available: 0,
            required: 1,
        };
        let api = err.to_api_error(&Locale("pt".into()));

        assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            api.details,
            Some(json!({ "sku": "agua", "available": 0, "required": 1 }))
        );
        assert!(api.error.contains("agua"));
    }

    #[test]
    fn conflict_names_the_current_assignee() {
        let api = AppError::OrderAlreadyAssigned {
            assignee: "Carlos".into(),
        }
        .to_api_error(&Locale("en".into()));

        assert_eq!(api.status, StatusCode::CONFLICT);
        assert_eq!(api.error, "Order already assigned.");
        assert_eq!(api.details, Some(json!({ "assignee": "Carlos" })));
    }

    #[test]
    fn validation_errors_are_grouped_by_field() {
        let errors = SignupForm { name: String::new() }.validate().unwrap_err();
        let api = AppError::ValidationError(errors).to_api_error(&Locale::default());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.details, Some(json!({ "name": ["obrigatório"] })));
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let api = AppError::InternalServerError(anyhow::anyhow!("senha do banco: hunter2"))
            .to_api_error(&Locale("en".into()));

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "An unexpected error occurred.");
        assert!(api.details.is_none());
    }

    #[test]
    fn payment_before_delivery_is_a_failed_precondition() {
        assert_eq!(
            AppError::OrderNotDelivered.status(),
            StatusCode::PRECONDITION_FAILED
        );
    }
}
