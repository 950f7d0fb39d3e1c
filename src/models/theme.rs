// src/models/theme.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

/// Tema padrão de todo usuário.
pub const ROOT_THEME: &str = "root";

// Tamanhos das colunas `theme`, `name` e `default_value`
pub const MAX_THEME_NAME_CHARS: usize = 30;
pub const MAX_VARIABLE_CHARS: usize = 50;

/// Nome da variável -> valor efetivo (ex.: "cor-fundo" -> "#ffffff").
pub type ThemeVariables = BTreeMap<String, String>;

// Última camada da cascata: o mínimo para a interface nunca ficar sem cor.
const BUILTIN_PALETTE: [(&str, &str); 8] = [
    ("cor-fundo", "#ffffff"),
    ("cor-texto", "#000000"),
    ("cor-botao", "#bbbbbb"),
    ("cor-botao-texto", "#000000"),
    ("cor-primaria", "#bbbbbb"),
    ("cor-secundaria", "#ffffff"),
    ("transicao-rapida", "0.2s"),
    ("transicao-lenta", "0.4s"),
];

pub fn builtin_palette() -> ThemeVariables {
    BUILTIN_PALETTE
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

// --- Variável de cor (tabela color_variables) ---
// tenant_id = None => padrão global.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColorVariable {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    #[schema(example = "rosa")]
    pub theme: String,
    #[schema(example = "cor-fundo")]
    pub name: String,
    #[schema(example = "#ffcbcd")]
    pub default_value: String,
    pub current_value: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ColorVariable {
    /// Valor personalizado tem prioridade sobre o padrão.
    pub fn effective_value(&self) -> &str {
        match self.current_value.as_deref().map(str::trim) {
            Some(current) if !current.is_empty() => current,
            _ => self.default_value.as_str(),
        }
    }
}

/// Nome do tema normalizado; vazio vira "root".
pub fn normalize_theme_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        ROOT_THEME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Nome de tema que vai ser gravado: normalizado e dentro do limite da coluna.
pub fn validated_theme_name(raw: &str) -> Result<String, AppError> {
    let theme = normalize_theme_name(raw);
    if theme.chars().count() > MAX_THEME_NAME_CHARS {
        return Err(AppError::InvalidInput(format!(
            "O nome do tema deve ter no máximo {} caracteres",
            MAX_THEME_NAME_CHARS
        )));
    }
    Ok(theme)
}

/// Cascata de temas: a primeira camada não vazia (ambiente+tema,
/// global+tema, global+root) é aplicada por cima da paleta embutida.
pub fn resolve_cascade(layers: &[Vec<ColorVariable>]) -> ThemeVariables {
    let mut variables = builtin_palette();

    if let Some(layer) = layers.iter().find(|layer| !layer.is_empty()) {
        for row in layer {
            variables.insert(row.name.clone(), row.effective_value().to_string());
        }
    }

    variables
}

/// Limpa o mapa recebido para substituir um tema: apara espaços, descarta
/// valores vazios e exige ao menos uma variável válida.
pub fn sanitize_theme_variables(
    theme: &str,
    variables: &BTreeMap<String, String>,
) -> Result<(String, ThemeVariables), AppError> {
    if theme.trim().is_empty() {
        return Err(AppError::InvalidInput("Informe o nome do tema".into()));
    }
    let theme = validated_theme_name(theme)?;
    if variables.is_empty() {
        return Err(AppError::InvalidInput("Informe ao menos uma cor".into()));
    }

    let clean: ThemeVariables = variables
        .iter()
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, value)| !name.is_empty() && !value.is_empty())
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    if clean.is_empty() {
        return Err(AppError::InvalidInput(
            "Nenhuma cor válida informada para o tema".into(),
        ));
    }
    if let Some((name, _)) = clean.iter().find(|(name, value)| {
        name.chars().count() > MAX_VARIABLE_CHARS || value.chars().count() > MAX_VARIABLE_CHARS
    }) {
        return Err(AppError::InvalidInput(format!(
            "A cor '{}' passa de {} caracteres",
            name, MAX_VARIABLE_CHARS
        )));
    }

    Ok((theme, clean))
}

// --- Respostas ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThemeNames {
    pub themes: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentTheme {
    #[schema(example = "rosa")]
    pub theme: String,
    pub variables: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThemeApplied {
    pub ok: bool,
    pub theme: String,
    #[schema(example = 3)]
    pub users_updated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(tenant_id: Option<Uuid>, theme: &str, name: &str, default: &str, current: Option<&str>) -> ColorVariable {
        ColorVariable {
            id: Uuid::new_v4(),
            tenant_id,
            theme: theme.into(),
            name: name.into(),
            default_value: default.into(),
            current_value: current.map(Into::into),
            description: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn no_rows_resolve_to_builtin_palette_exactly() {
        let resolved = resolve_cascade(&[vec![], vec![], vec![]]);

        assert_eq!(resolved, builtin_palette());
        assert_eq!(resolved["cor-fundo"], "#ffffff");
        assert_eq!(resolved["cor-texto"], "#000000");
    }

    #[test]
    fn tenant_rows_win_over_global_rows() {
        let tenant = Some(Uuid::new_v4());
        let resolved = resolve_cascade(&[
            vec![row(tenant, "rosa", "cor-fundo", "#000001", None)],
            vec![row(None, "rosa", "cor-fundo", "#ffcbcd", None)],
            vec![row(None, "root", "cor-fundo", "#ffffff", None)],
        ]);

        assert_eq!(resolved["cor-fundo"], "#000001");
        // Variáveis que a camada não define vêm da paleta embutida
        assert_eq!(resolved["transicao-lenta"], "0.4s");
    }

    #[test]
    fn falls_back_to_global_root_when_theme_is_unknown() {
        let resolved = resolve_cascade(&[
            vec![],
            vec![],
            vec![row(None, "root", "cor-primaria", "#123456", None)],
        ]);

        assert_eq!(resolved["cor-primaria"], "#123456");
    }

    #[test]
    fn current_value_overrides_default_value() {
        let resolved = resolve_cascade(&[vec![
            row(None, "azul", "cor-botao", "#6699ff", Some("#ff0000")),
            row(None, "azul", "cor-texto", "#000000", Some("  ")),
        ]]);

        assert_eq!(resolved["cor-botao"], "#ff0000");
        assert_eq!(resolved["cor-texto"], "#000000");
    }

    #[test]
    fn sanitize_drops_blank_values() {
        let input = BTreeMap::from([
            ("cor-fundo".to_string(), " #fff ".to_string()),
            ("cor-texto".to_string(), "".to_string()),
        ]);

        let (theme, clean) = sanitize_theme_variables(" noite ", &input).unwrap();

        assert_eq!(theme, "noite");
        assert_eq!(clean, BTreeMap::from([("cor-fundo".to_string(), "#fff".to_string())]));
    }

    #[test]
    fn sanitize_rejects_empty_inputs() {
        let only_blank = BTreeMap::from([("cor-fundo".to_string(), "   ".to_string())]);

        assert!(sanitize_theme_variables("", &only_blank).is_err());
        assert!(sanitize_theme_variables("noite", &BTreeMap::new()).is_err());
        assert!(sanitize_theme_variables("noite", &only_blank).is_err());
    }

    #[test]
    fn blank_theme_name_means_root() {
        assert_eq!(normalize_theme_name("  "), ROOT_THEME);
        assert_eq!(normalize_theme_name(" rosa "), "rosa");
    }

    #[test]
    fn names_and_values_past_column_limits_are_rejected() {
        let long = "x".repeat(MAX_VARIABLE_CHARS + 1);
        let colors = BTreeMap::from([("cor-fundo".to_string(), "#fff".to_string())]);

        assert!(matches!(
            sanitize_theme_variables(&"t".repeat(MAX_THEME_NAME_CHARS + 1), &colors),
            Err(AppError::InvalidInput(_))
        ));
        assert!(sanitize_theme_variables(
            "noite",
            &BTreeMap::from([(long.clone(), "#fff".to_string())])
        )
        .is_err());
        assert!(sanitize_theme_variables(
            "noite",
            &BTreeMap::from([("cor-fundo".to_string(), long)])
        )
        .is_err());

        // Limite conta caracteres, não bytes
        assert!(sanitize_theme_variables(&"ç".repeat(MAX_THEME_NAME_CHARS), &colors).is_ok());
    }

    #[test]
    fn theme_to_apply_respects_column_limit() {
        assert_eq!(validated_theme_name("  ").unwrap(), ROOT_THEME);
        assert_eq!(validated_theme_name(" rosa ").unwrap(), "rosa");
        assert!(validated_theme_name(&"a".repeat(MAX_THEME_NAME_CHARS + 1)).is_err());
    }
}
