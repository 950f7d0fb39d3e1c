// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::create_user,

        // --- Tenancy ---
        handlers::tenancy::create_tenant,

        // --- Stock ---
        handlers::stock::get_stock,

        // --- Customers ---
        handlers::customers::create_customer,
        handlers::customers::list_customers,

        // --- Orders ---
        handlers::orders::create_order,
        handlers::orders::pickup_order,
        handlers::orders::confirm_delivery,
        handlers::orders::confirm_payment,
        handlers::orders::list_pending,
        handlers::orders::list_current,
        handlers::orders::list_history,
        handlers::orders::list_awaiting_payment,

        // --- Themes ---
        handlers::themes::list_themes,
        handlers::themes::list_theme_names,
        handlers::themes::current_theme,
        handlers::themes::save_custom_theme,
        handlers::themes::apply_theme_to_me,
        handlers::themes::apply_theme_to_tenant,

        // --- Dashboard ---
        handlers::dashboard::get_cards,
        handlers::dashboard::get_finance,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::CreateUserPayload,
            models::auth::AuthResponse,

            // --- Tenancy ---
            models::tenancy::Tenant,
            models::tenancy::ProvisionedTenant,
            handlers::tenancy::CreateTenantPayload,

            // --- Stock ---
            models::stock::Sku,
            models::stock::StockLevels,
            models::stock::StockRecord,
            models::stock::StockSummary,

            // --- Customers ---
            models::customers::Customer,
            models::customers::CustomerResponse,
            handlers::customers::CreateCustomerPayload,

            // --- Orders ---
            models::orders::PaymentMethod,
            models::orders::Order,
            models::orders::OrderResponse,
            models::orders::PickupResponse,
            models::manifest::IgnoreReason,
            models::manifest::IgnoredSegment,
            handlers::orders::CreateOrderPayload,
            handlers::orders::ManifestItemPayload,

            // --- Themes ---
            models::theme::ColorVariable,
            models::theme::ThemeNames,
            models::theme::CurrentTheme,
            models::theme::ThemeApplied,
            handlers::themes::CustomThemePayload,
            handlers::themes::ApplyThemePayload,

            // --- Dashboard ---
            models::dashboard::DashboardCards,
            models::dashboard::PaymentMethodCount,
            models::dashboard::FinanceSummary,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação"),
        (name = "Users", description = "Dados do Usuário e cadastro no ambiente"),
        (name = "Tenancy", description = "Provisionamento de Ambientes"),
        (name = "Stock", description = "Estoque de gás e água"),
        (name = "Customers", description = "Endereços de clientes"),
        (name = "Orders", description = "Pedidos: criação, retirada, entrega e pagamento"),
        (name = "Themes", description = "Temas de cores por ambiente e usuário"),
        (name = "Dashboard", description = "Indicadores do painel")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_pickup_and_bearer_scheme() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/orders/{id}/pickup"));
        assert!(doc.paths.paths.contains_key("/api/themes/apply-to-tenant"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
