use std::sync::Arc;

use depot_core::{
    MemoryLedger, ProductOperations, ProductService, WarehouseOperations, WarehouseService,
};
use depot_store::DbClient;

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductOperations>,
    pub warehouses: Arc<dyn WarehouseOperations>,
    /// Probed by `/health`; absent when no database backs the services.
    pub db: Option<DbClient>,
}

impl AppState {
    pub fn new(
        products: Arc<dyn ProductOperations>,
        warehouses: Arc<dyn WarehouseOperations>,
    ) -> Self {
        Self {
            products,
            warehouses,
            db: None,
        }
    }

    /// Services over the Postgres ledgers sharing `db`'s pool.
    pub fn from_db(db: DbClient) -> Self {
        let products = ProductService::new(Arc::new(db.product_ledger()));
        let warehouses = WarehouseService::new(Arc::new(db.warehouse_ledger()));

        Self {
            products: Arc::new(products),
            warehouses: Arc::new(warehouses),
            db: Some(db),
        }
    }

    pub fn in_memory() -> Self {
        let ledger = Arc::new(MemoryLedger::new());
        Self::new(
            Arc::new(ProductService::new(ledger.clone())),
            Arc::new(WarehouseService::new(ledger)),
        )
    }
}
