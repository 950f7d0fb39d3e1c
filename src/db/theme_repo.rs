// src/db/theme_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::theme::ColorVariable,
};

#[derive(Clone)]
pub struct ThemeRepository {
    pool: PgPool,
}

impl ThemeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Linhas de um tema. `tenant_id = None` busca os padrões globais.
    pub async fn find_variables(
        &self,
        tenant_id: Option<Uuid>,
        theme: &str,
    ) -> Result<Vec<ColorVariable>, AppError> {
        let rows = sqlx::query_as::<_, ColorVariable>(
            r#"
            SELECT * FROM color_variables
            WHERE tenant_id IS NOT DISTINCT FROM $1 AND theme = $2
            ORDER BY name
            "#,
        )
            .bind(tenant_id)
            .bind(theme)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Nomes de temas visíveis para o ambiente: os dele mais os globais.
    pub async fn list_theme_names(&self, tenant_id: Uuid) -> Result<Vec<String>, AppError> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT theme FROM color_variables
            WHERE tenant_id = $1 OR tenant_id IS NULL
            ORDER BY theme
            "#,
        )
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(names)
    }

    // ---
    // Escrita (Transacional)
    // ---

    pub async fn delete_theme<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        theme: &str,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM color_variables WHERE tenant_id = $1 AND theme = $2")
            .bind(tenant_id)
            .bind(theme)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn insert_variable<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        theme: &str,
        name: &str,
        value: &str,
    ) -> Result<ColorVariable, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ColorVariable>(
            r#"
            INSERT INTO color_variables (tenant_id, theme, name, default_value)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
            .bind(tenant_id)
            .bind(theme)
            .bind(name)
            .bind(value)
            .fetch_one(executor)
            .await?;

        Ok(row)
    }
}
