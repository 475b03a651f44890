use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

use crate::app_config::DatabaseConfig;
use crate::{PgProductLedger, PgWarehouseLedger};

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(config.connect_options()?)
            .await?;

        info!(
            host = %config.host,
            database = %config.name,
            max_connections = config.max_connections,
            "Connected to Postgres"
        );
        Ok(Self { pool })
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    pub fn product_ledger(&self) -> PgProductLedger {
        PgProductLedger::new(self.pool.clone())
    }

    pub fn warehouse_ledger(&self) -> PgWarehouseLedger {
        PgWarehouseLedger::new(self.pool.clone())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
