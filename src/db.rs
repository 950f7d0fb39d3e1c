pub mod user_repo;
pub use user_repo::UserRepository;
pub mod tenancy_repo;
pub use tenancy_repo::TenantRepository;
pub mod stock_repo;
pub use stock_repo::StockRepository;
pub mod orders_repo;
pub use orders_repo::OrdersRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod theme_repo;
pub use theme_repo::ThemeRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
