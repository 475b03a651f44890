use async_trait::async_trait;
use depot_core::{LedgerError, LedgerResult, WarehouseLedger};
use depot_shared::{GetFromWarehouse, NewWarehouse, Product, Warehouse};
use sqlx::PgPool;

use crate::error::StoreResultExt;
use crate::product_repo::ProductRow;

const WAREHOUSES: &str = "warehouses";
const STOCK: &str = "warehouse_products";

#[derive(Clone)]
pub struct PgWarehouseLedger {
    pool: PgPool,
}

impl PgWarehouseLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WarehouseLedger for PgWarehouseLedger {
    async fn create_warehouse(&self, warehouse: &NewWarehouse) -> LedgerResult<Warehouse> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO warehouses (name, availability) VALUES ($1, $2) RETURNING id",
        )
        .bind(&warehouse.name)
        .bind(warehouse.availability)
        .fetch_one(&self.pool)
        .await
        .ledger("create_warehouse", WAREHOUSES)?;

        Ok(Warehouse {
            id,
            name: warehouse.name.clone(),
            availability: warehouse.availability,
        })
    }

    async fn list_available_stock(&self, gw: &GetFromWarehouse) -> LedgerResult<Vec<Product>> {
        const OP: &str = "list_available_stock";

        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT p.name, p.size, p.code, wp.available_quantity AS quantity
            FROM warehouse_products wp
            JOIN products p ON wp.product_code = p.code
            JOIN warehouses w ON wp.warehouse_id = w.id
            WHERE w.availability = true AND wp.warehouse_id = $1 AND wp.available_quantity > 0
            ORDER BY p.code
            "#,
        )
        .bind(gw.warehouse_id)
        .fetch_all(&self.pool)
        .await
        .ledger(OP, STOCK)?;

        if rows.is_empty() {
            return Err(LedgerError::not_found(OP, STOCK));
        }

        rows.into_iter()
            .map(|row| row.into_product(OP, STOCK))
            .collect()
    }
}
