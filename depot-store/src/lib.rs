pub mod app_config;
pub mod database;
mod error;
pub mod product_repo;
pub mod warehouse_repo;

pub use app_config::Config;
pub use database::DbClient;
pub use product_repo::PgProductLedger;
pub use warehouse_repo::PgWarehouseLedger;
