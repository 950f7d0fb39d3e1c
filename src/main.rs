//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

// Importações principais
use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logger: nível vem de RUST_LOG (padrão "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    if let Some(seed) = &config.bootstrap {
        app_state.tenant_service.bootstrap(seed).await?;
    }

    let app = build_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(app_state: AppState) -> Router {
    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login));

    // Tudo abaixo passa pelo auth_guard (usuário + ambiente)
    let user_routes = Router::new()
        .route("/", post(handlers::auth::create_user))
        .route("/me", get(handlers::auth::get_me));

    let tenancy_routes = Router::new()
        .route("/", post(handlers::tenancy::create_tenant));

    let customer_routes = Router::new()
        .route("/"
               ,post(handlers::customers::create_customer)
               .get(handlers::customers::list_customers)
        );

    let order_routes = Router::new()
        .route("/", post(handlers::orders::create_order))
        .route("/pending", get(handlers::orders::list_pending))
        .route("/current", get(handlers::orders::list_current))
        .route("/history", get(handlers::orders::list_history))
        .route("/awaiting-payment", get(handlers::orders::list_awaiting_payment))
        .route("/{id}/pickup", post(handlers::orders::pickup_order))
        .route("/{id}/confirm-delivery", post(handlers::orders::confirm_delivery))
        .route("/{id}/confirm-payment", post(handlers::orders::confirm_payment));

    let theme_routes = Router::new()
        .route("/", get(handlers::themes::list_themes))
        .route("/names", get(handlers::themes::list_theme_names))
        .route("/current", get(handlers::themes::current_theme))
        .route("/custom", post(handlers::themes::save_custom_theme))
        .route("/apply-to-tenant", post(handlers::themes::apply_theme_to_tenant))
        .route("/{name}/apply", post(handlers::themes::apply_theme_to_me));

    let dashboard_routes = Router::new()
        .route("/cards", get(handlers::dashboard::get_cards))
        .route("/finance", get(handlers::dashboard::get_finance));

    let protected = Router::new()
        .nest("/users", user_routes)
        .nest("/tenants", tenancy_routes)
        .route("/stock", get(handlers::stock::get_stock))
        .nest("/customers", customer_routes)
        .nest("/orders", order_routes)
        .nest("/themes", theme_routes)
        .nest("/dashboard", dashboard_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected)
        .with_state(app_state)
}
