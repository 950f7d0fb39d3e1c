// src/services/theme_service.rs

use std::collections::BTreeMap;

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::{db_utils::finish_tx, error::AppError},
    db::{ThemeRepository, UserRepository},
    models::{
        auth::User,
        theme::{
            normalize_theme_name, resolve_cascade, sanitize_theme_variables,
            validated_theme_name, CurrentTheme, ThemeApplied, ThemeVariables, ROOT_THEME,
        },
    },
};

#[derive(Clone)]
pub struct ThemeService {
    theme_repo: ThemeRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

/// Junta os nomes vindos do banco com "root", sem repetição e em ordem.
pub fn merge_theme_names(names: Vec<String>) -> Vec<String> {
    let mut merged: Vec<String> = names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    merged.push(ROOT_THEME.to_string());
    merged.sort();
    merged.dedup();
    merged
}

/// Destino da gravação de um tema do ambiente.
pub(crate) trait ThemeStore {
    async fn delete_theme(&mut self, tenant_id: Uuid, theme: &str) -> Result<u64, AppError>;

    async fn insert_variable(
        &mut self,
        tenant_id: Uuid,
        theme: &str,
        name: &str,
        value: &str,
    ) -> Result<(), AppError>;
}

// Repositório + conexão da transação em andamento
struct TxThemeStore<'a> {
    repo: &'a ThemeRepository,
    conn: &'a mut PgConnection,
}

impl ThemeStore for TxThemeStore<'_> {
    async fn delete_theme(&mut self, tenant_id: Uuid, theme: &str) -> Result<u64, AppError> {
        self.repo.delete_theme(&mut *self.conn, tenant_id, theme).await
    }

    async fn insert_variable(
        &mut self,
        tenant_id: Uuid,
        theme: &str,
        name: &str,
        value: &str,
    ) -> Result<(), AppError> {
        self.repo
            .insert_variable(&mut *self.conn, tenant_id, theme, name, value)
            .await?;
        Ok(())
    }
}

/// Apaga o tema do ambiente e grava o conjunto novo no lugar.
/// Nenhuma variável do conjunto anterior sobrevive.
pub(crate) async fn write_theme_layer<S: ThemeStore>(
    store: &mut S,
    tenant_id: Uuid,
    theme: &str,
    variables: &ThemeVariables,
) -> Result<(), AppError> {
    store.delete_theme(tenant_id, theme).await?;
    for (name, value) in variables {
        store.insert_variable(tenant_id, theme, name, value).await?;
    }
    Ok(())
}

impl ThemeService {
    pub fn new(theme_repo: ThemeRepository, user_repo: UserRepository, pool: PgPool) -> Self {
        Self { theme_repo, user_repo, pool }
    }

    /// Variáveis efetivas de (ambiente, tema).
    /// Camadas: ambiente+tema, global+tema, global+root, paleta embutida.
    pub async fn resolve(&self, tenant_id: Uuid, theme: &str) -> Result<ThemeVariables, AppError> {
        let theme = normalize_theme_name(theme);

        // Só busca a próxima camada se a anterior vier vazia
        let candidates = [
            (Some(tenant_id), theme.as_str()),
            (None, theme.as_str()),
            (None, ROOT_THEME),
        ];
        for (owner, name) in candidates {
            let layer = self.theme_repo.find_variables(owner, name).await?;
            if !layer.is_empty() {
                return Ok(resolve_cascade(&[layer]));
            }
        }

        Ok(resolve_cascade(&[]))
    }

    pub async fn list_theme_names(&self, tenant_id: Uuid) -> Result<Vec<String>, AppError> {
        let names = self.theme_repo.list_theme_names(tenant_id).await?;
        Ok(merge_theme_names(names))
    }

    /// Tema -> variáveis resolvidas, para todos os temas visíveis.
    pub async fn list_themes(&self, tenant_id: Uuid) -> Result<BTreeMap<String, ThemeVariables>, AppError> {
        let mut themes = BTreeMap::new();
        for name in self.list_theme_names(tenant_id).await? {
            let variables = self.resolve(tenant_id, &name).await?;
            themes.insert(name, variables);
        }
        Ok(themes)
    }

    pub async fn current_theme(&self, user: &User) -> Result<CurrentTheme, AppError> {
        let theme = normalize_theme_name(&user.theme);
        let variables = self.resolve(user.tenant_id, &theme).await?;
        Ok(CurrentTheme { theme, variables })
    }

    /// Substitui por completo as variáveis de um tema do ambiente.
    pub async fn replace_theme(
        &self,
        tenant_id: Uuid,
        theme: &str,
        variables: &BTreeMap<String, String>,
    ) -> Result<CurrentTheme, AppError> {
        // Validação antes de qualquer escrita
        let (theme, clean) = sanitize_theme_variables(theme, variables)?;

        let mut tx = self.pool.begin().await?;
        let result = {
            let mut store = TxThemeStore { repo: &self.theme_repo, conn: &mut *tx };
            write_theme_layer(&mut store, tenant_id, &theme, &clean).await
        };
        finish_tx(tx, result).await?;

        tracing::info!("🎨 Tema '{}' gravado no ambiente {} ({} cores)", theme, tenant_id, clean.len());

        let variables = self.resolve(tenant_id, &theme).await?;
        Ok(CurrentTheme { theme, variables })
    }

    pub async fn apply_to_user(&self, user: &User, theme: &str) -> Result<CurrentTheme, AppError> {
        let theme = validated_theme_name(theme)?;
        let updated = self.user_repo.update_theme(&self.pool, user.id, &theme).await?;
        self.current_theme(&updated).await
    }

    /// Aplica o tema a todos os usuários do ambiente (tudo ou nada).
    pub async fn apply_to_tenant(&self, tenant_id: Uuid, theme: &str) -> Result<ThemeApplied, AppError> {
        let theme = validated_theme_name(theme)?;

        let mut tx = self.pool.begin().await?;
        let result = self.user_repo
            .update_theme_for_tenant(&mut *tx, tenant_id, &theme)
            .await;
        let users_updated = finish_tx(tx, result).await?;

        tracing::info!("🎨 Tema '{}' aplicado a {} usuários do ambiente {}", theme, users_updated, tenant_id);
        Ok(ThemeApplied { ok: true, theme, users_updated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_names_always_include_root_once() {
        let names = merge_theme_names(vec!["rosa".into(), "azul".into(), "rosa".into(), " ".into()]);

        assert_eq!(names, vec!["azul", "rosa", "root"]);
        assert_eq!(merge_theme_names(vec![]), vec!["root"]);
        assert_eq!(merge_theme_names(vec!["root".into()]), vec!["root"]);
    }

    // Guarda em memória com a mesma chave única da tabela color_variables
    #[derive(Default)]
    struct MemoryStore {
        rows: BTreeMap<(Uuid, String, String), String>,
    }

    impl MemoryStore {
        fn theme(&self, tenant_id: Uuid, theme: &str) -> ThemeVariables {
            self.rows
                .iter()
                .filter(|((t, th, _), _)| *t == tenant_id && th == theme)
                .map(|((_, _, name), value)| (name.clone(), value.clone()))
                .collect()
        }
    }

    impl ThemeStore for MemoryStore {
        async fn delete_theme(&mut self, tenant_id: Uuid, theme: &str) -> Result<u64, AppError> {
            let before = self.rows.len();
            self.rows.retain(|(t, th, _), _| !(*t == tenant_id && th == theme));
            Ok((before - self.rows.len()) as u64)
        }

        async fn insert_variable(
            &mut self,
            tenant_id: Uuid,
            theme: &str,
            name: &str,
            value: &str,
        ) -> Result<(), AppError> {
            let key = (tenant_id, theme.to_string(), name.to_string());
            if self.rows.contains_key(&key) {
                return Err(AppError::InvalidInput(format!("variável duplicada: {}", name)));
            }
            self.rows.insert(key, value.to_string());
            Ok(())
        }
    }

    fn colors(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn replacing_twice_keeps_only_the_second_set() {
        let tenant = Uuid::new_v4();
        let other_tenant = Uuid::new_v4();
        let mut store = MemoryStore::default();

        let (theme, first) = sanitize_theme_variables(
            "noite",
            &colors(&[("cor-fundo", "#111111"), ("cor-texto", "#eeeeee")]),
        )
        .unwrap();
        write_theme_layer(&mut store, tenant, &theme, &first).await.unwrap();
        write_theme_layer(&mut store, tenant, "azul", &colors(&[("cor-botao", "#0000ff")]))
            .await
            .unwrap();
        write_theme_layer(&mut store, other_tenant, "noite", &first).await.unwrap();

        let (theme, second) = sanitize_theme_variables(
            " noite ",
            &colors(&[("cor-botao", "#222222"), ("cor-texto", "  ")]),
        )
        .unwrap();
        write_theme_layer(&mut store, tenant, &theme, &second).await.unwrap();

        assert_eq!(store.theme(tenant, "noite"), colors(&[("cor-botao", "#222222")]));
        assert_eq!(store.theme(tenant, "azul"), colors(&[("cor-botao", "#0000ff")]));
        assert_eq!(store.theme(other_tenant, "noite"), first);
    }
}
