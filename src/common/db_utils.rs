// src/common/db_utils.rs

use sqlx::{Postgres, Transaction};

use crate::common::error::AppError;

/// Fecha a transação conforme o resultado da operação:
/// Ok => commit, Err => rollback explícito (e o erro original é devolvido).
pub async fn finish_tx<T>(
    tx: Transaction<'_, Postgres>,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                // O erro de negócio é mais útil para o cliente; o do rollback só vai pro log
                tracing::error!("🔥 Falha no rollback da transação: {:?}", rollback_err);
            }
            Err(err)
        }
    }
}
