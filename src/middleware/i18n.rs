// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

// O sistema nasceu em português; inglês é a alternativa.
const DEFAULT_LANG: &str = "pt";

// Extrator de idioma
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl Locale {
    /// Escolhe a mensagem em português ou em inglês.
    pub fn text(&self, pt: &str, en: &str) -> String {
        if self.0 == "en" { en.to_string() } else { pt.to_string() }
    }

    pub fn from_header(header_str: &str) -> Self {
        accept_language::parse(header_str)
            .first() // Pega o primeiro idioma (ex: "pt-BR")
            .map(|tag_string| {
                // "pt-BR" -> split vira ["pt", "BR"] -> next() pega "pt"
                tag_string
                    .split('-')
                    .next()
                    .unwrap_or(tag_string.as_str())
                    .to_lowercase()
            })
            .map(Locale)
            .unwrap_or_default()
    }

    /// Idioma pedido no cabeçalho Accept-Language (ou o padrão).
    pub fn from_parts(parts: &Parts) -> Self {
        parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Locale::from_parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn picks_primary_subtag_of_preferred_language() {
        assert_eq!(Locale::from_header("en-US,en;q=0.9"), Locale("en".into()));
        assert_eq!(Locale::from_header("pt-BR"), Locale("pt".into()));
    }

    #[test]
    fn unknown_languages_fall_back_to_portuguese_messages() {
        let locale = Locale::from_header("fr-FR");
        assert_eq!(locale.text("olá", "hello"), "olá");
    }

    #[tokio::test]
    async fn missing_header_uses_default() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let Ok(locale) = Locale::from_request_parts(&mut parts, &()).await;
        assert_eq!(locale, Locale::default());
    }

    #[tokio::test]
    async fn reads_accept_language_header() {
        let (mut parts, _) = Request::builder()
            .header(header::ACCEPT_LANGUAGE, "en")
            .body(())
            .unwrap()
            .into_parts();
        let Ok(locale) = Locale::from_request_parts(&mut parts, &()).await;
        assert_eq!(locale.text("sim", "yes"), "yes");
    }
}
