// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        CustomerRepository, DashboardRepository, OrdersRepository, StockRepository,
        TenantRepository, ThemeRepository, UserRepository,
    },
    services::{
        auth::AuthService, customer_service::CustomerService,
        dashboard_service::DashboardService, fulfillment::FulfillmentService,
        order_service::OrderService, stock_service::StockService,
        tenancy_service::TenantService, theme_service::ThemeService,
    },
};

/// Primeiro ambiente + administrador criados na inicialização.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub tenant: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

// Configurações lidas do ambiente (.env)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub bootstrap: Option<BootstrapAdmin>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Leitura a partir de uma função de busca, para poder testar sem mexer no ambiente.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} deve ser definida", key))
        };

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.trim().parse().context("DB_MAX_CONNECTIONS inválido")?,
            None => 5,
        };
        let db_acquire_timeout = match lookup("DB_ACQUIRE_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse().context("DB_ACQUIRE_TIMEOUT_SECS inválido")?),
            None => Duration::from_secs(3),
        };

        // Bootstrap é tudo ou nada
        let bootstrap_keys = [
            "BOOTSTRAP_TENANT",
            "BOOTSTRAP_ADMIN_NAME",
            "BOOTSTRAP_ADMIN_EMAIL",
            "BOOTSTRAP_ADMIN_PASSWORD",
        ];
        let values: Vec<Option<String>> = bootstrap_keys
            .iter()
            .map(|key| lookup(key).filter(|v| !v.trim().is_empty()))
            .collect();
        let bootstrap = match values.as_slice() {
            [Some(tenant), Some(name), Some(email), Some(password)] => Some(BootstrapAdmin {
                tenant: tenant.clone(),
                name: name.clone(),
                email: email.clone(),
                password: password.clone(),
            }),
            all if all.iter().all(Option::is_none) => None,
            _ => anyhow::bail!("Defina todas as variáveis BOOTSTRAP_* ou nenhuma"),
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            db_max_connections,
            db_acquire_timeout,
            bootstrap,
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub tenant_service: TenantService,
    pub stock_service: StockService,
    pub customer_service: CustomerService,
    pub order_service: OrderService,
    pub fulfillment_service: FulfillmentService,
    pub theme_service: ThemeService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, config))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_pool(db_pool: PgPool, config: &Config) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let tenant_repo = TenantRepository::new(db_pool.clone());
        let stock_repo = StockRepository::new(db_pool.clone());
        let orders_repo = OrdersRepository::new(db_pool.clone());
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let theme_repo = ThemeRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), config.jwt_secret.clone(), db_pool.clone());
        let tenant_service = TenantService::new(
            tenant_repo,
            stock_repo.clone(),
            user_repo.clone(),
            db_pool.clone(),
        );
        let stock_service = StockService::new(stock_repo.clone());
        let customer_service = CustomerService::new(customer_repo, db_pool.clone());
        let order_service = OrderService::new(orders_repo.clone(), db_pool.clone());
        let fulfillment_service = FulfillmentService::new(orders_repo, stock_repo, db_pool.clone());
        let theme_service = ThemeService::new(theme_repo, user_repo, db_pool.clone());
        let dashboard_service = DashboardService::new(dashboard_repo, stock_service.clone());

        Self {
            db_pool,
            auth_service,
            tenant_service,
            stock_service,
            customer_service,
            order_service,
            fulfillment_service,
            theme_service,
            dashboard_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/ultragas"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.db_acquire_timeout, Duration::from_secs(3));
        assert!(config.bootstrap.is_none());
    }

    #[test]
    fn missing_secret_is_an_error() {
        let result = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/ultragas")]));

        assert!(result.is_err());
    }

    #[test]
    fn bootstrap_is_all_or_nothing() {
        let base = [
            ("DATABASE_URL", "postgres://localhost/ultragas"),
            ("JWT_SECRET", "segredo"),
            ("BOOTSTRAP_TENANT", "Centro"),
        ];
        assert!(Config::from_lookup(lookup(&base)).is_err());

        let full = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/ultragas"),
            ("JWT_SECRET", "segredo"),
            ("BOOTSTRAP_TENANT", "Centro"),
            ("BOOTSTRAP_ADMIN_NAME", "Admin"),
            ("BOOTSTRAP_ADMIN_EMAIL", "admin@example.com"),
            ("BOOTSTRAP_ADMIN_PASSWORD", "admin123"),
        ]))
        .unwrap();
        let seed = full.bootstrap.unwrap();
        assert_eq!(seed.tenant, "Centro");
        assert_eq!(seed.email, "admin@example.com");
    }
}
