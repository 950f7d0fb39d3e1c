pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod manifest;
pub mod orders;
pub mod stock;
pub mod tenancy;
pub mod theme;
