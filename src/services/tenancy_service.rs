// src/services/tenancy_service.rs

use sqlx::PgPool;

use crate::{
    common::{db_utils::finish_tx, error::AppError},
    config::BootstrapAdmin,
    db::{StockRepository, TenantRepository, UserRepository},
    models::{
        auth::UserRole,
        stock::StockLevels,
        tenancy::{ProvisionedTenant, Tenant},
    },
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct TenantService {
    tenant_repo: TenantRepository,
    stock_repo: StockRepository,
    user_repo: UserRepository,
    pool: PgPool, // Usamos a pool para iniciar transações
}

impl TenantService {
    pub fn new(
        tenant_repo: TenantRepository,
        stock_repo: StockRepository,
        user_repo: UserRepository,
        pool: PgPool,
    ) -> Self {
        Self { tenant_repo, stock_repo, user_repo, pool }
    }

    /// Cria um novo ambiente e, atomicamente, o seu registro de estoque.
    /// Todo ambiente nasce com estoque (zerado ou com os valores informados).
    pub async fn provision_tenant(
        &self,
        name: &str,
        initial_stock: StockLevels,
    ) -> Result<ProvisionedTenant, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput("Informe o nome do ambiente".into()));
        }
        // Regras do estoque validadas antes de qualquer escrita
        initial_stock.validate()?;

        let mut tx = self.pool.begin().await?;

        let result = async {
            let tenant = self.tenant_repo.create_tenant(&mut *tx, name).await?;
            let stock = self.stock_repo
                .create_stock(&mut *tx, tenant.id, &initial_stock)
                .await?;
            Ok::<_, AppError>(ProvisionedTenant { tenant, stock })
        }
        .await;

        let provisioned = finish_tx(tx, result).await?;
        tracing::info!("🏢 Ambiente '{}' provisionado ({})", provisioned.tenant.name, provisioned.tenant.id);
        Ok(provisioned)
    }

    /// Primeiro ambiente + administrador, a partir da configuração.
    /// Idempotente: se o e-mail já existe, nada é feito.
    pub async fn bootstrap(&self, seed: &BootstrapAdmin) -> Result<(), AppError> {
        if self.user_repo.find_by_email(&seed.email).await?.is_some() {
            tracing::info!("Bootstrap: administrador {} já existe, nada a fazer.", seed.email);
            return Ok(());
        }

        let tenant: Tenant = match self.tenant_repo.find_by_name(&seed.tenant).await? {
            Some(tenant) => tenant,
            None => self.provision_tenant(&seed.tenant, StockLevels::default()).await?.tenant,
        };

        let hashed_password = hash_password(&seed.password).await?;
        let admin = self.user_repo
            .create_user(
                &self.pool,
                tenant.id,
                &seed.name,
                &seed.email,
                &hashed_password,
                UserRole::Admin,
            )
            .await?;

        tracing::info!("✅ Bootstrap: administrador {} criado no ambiente '{}'", admin.email, tenant.name);
        Ok(())
    }
}
