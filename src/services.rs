pub mod auth;
pub mod customer_service;
pub mod dashboard_service;
pub mod fulfillment;
pub mod order_service;
pub mod stock_service;
pub mod tenancy_service;
pub mod theme_service;
