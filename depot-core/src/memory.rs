//! In-process ledger with the same transactional contract as the Postgres
//! one. Used by tests and for running the service without a database.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use depot_shared::{
    AddProduct, DeleteProduct, GetFromWarehouse, NewWarehouse, Product, TransferProduct,
    Warehouse, WarehouseProduct,
};
use tokio::sync::Mutex;
use tracing::debug;

use crate::repository::{ProductLedger, WarehouseLedger};
use crate::{LedgerError, LedgerResult};

const PRODUCTS: &str = "products";
const STOCK: &str = "warehouse_products";

/// Counters held for one (warehouse, product) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StockLevel {
    pub available_quantity: u64,
    pub reserved_quantity: u64,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    products: HashMap<String, Product>,
    warehouses: BTreeMap<i64, Warehouse>,
    stock: BTreeMap<(i64, String), StockLevel>,
    next_warehouse_id: i64,
}

impl Tables {
    fn stock_mut(&mut self, op: &'static str, warehouse_id: i64, code: &str) -> LedgerResult<&mut StockLevel> {
        self.stock
            .get_mut(&(warehouse_id, code.to_string()))
            .ok_or_else(|| LedgerError::not_found(op, STOCK))
    }

    /// Insert-or-increment of the available counter, with the foreign keys
    /// the schema would enforce.
    fn credit(&mut self, op: &'static str, warehouse_id: i64, code: &str, quantity: u64) -> LedgerResult<()> {
        if !self.warehouses.contains_key(&warehouse_id) {
            return Err(LedgerError::constraint(op, STOCK, format!("warehouse {} does not exist", warehouse_id)));
        }
        if !self.products.contains_key(code) {
            return Err(LedgerError::constraint(op, STOCK, format!("product {} does not exist", code)));
        }

        let row = self.stock.entry((warehouse_id, code.to_string())).or_default();
        row.available_quantity = row
            .available_quantity
            .checked_add(quantity)
            .ok_or_else(|| LedgerError::constraint(op, STOCK, "available_quantity overflow"))?;
        Ok(())
    }
}

pub struct MemoryLedger {
    tables: Mutex<Tables>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables {
                next_warehouse_id: 1,
                ..Tables::default()
            }),
        }
    }

    pub async fn stock(&self, warehouse_id: i64, code: &str) -> Option<StockLevel> {
        self.tables
            .lock()
            .await
            .stock
            .get(&(warehouse_id, code.to_string()))
            .copied()
    }

    pub async fn product(&self, code: &str) -> Option<Product> {
        self.tables.lock().await.products.get(code).cloned()
    }

    /// Runs `f` against a private copy of the tables and publishes the copy
    /// only when `f` succeeds.
    async fn transaction<T>(&self, f: impl FnOnce(&mut Tables) -> LedgerResult<T>) -> LedgerResult<T> {
        let mut committed = self.tables.lock().await;
        let mut working = committed.clone();
        let out = f(&mut working)?;
        *committed = working;
        Ok(out)
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductLedger for MemoryLedger {
    async fn create_product(&self, product: &Product) -> LedgerResult<()> {
        self.transaction(|t| {
            if t.products.contains_key(&product.code) {
                return Err(LedgerError::constraint(
                    "create_product",
                    PRODUCTS,
                    format!("duplicate code {}", product.code),
                ));
            }
            t.products.insert(product.code.clone(), product.clone());
            Ok(())
        })
        .await
    }

    async fn reserve(&self, wp: &WarehouseProduct) -> LedgerResult<()> {
        self.transaction(|t| {
            let row = t.stock_mut("reserve", wp.warehouse_id, &wp.code)?;
            if row.available_quantity < wp.quantity {
                return Err(LedgerError::InsufficientQuantity {
                    op: "reserve",
                    warehouse_id: wp.warehouse_id,
                    code: wp.code.clone(),
                    requested: wp.quantity,
                    available: row.available_quantity,
                });
            }
            row.available_quantity -= wp.quantity;
            row.reserved_quantity += wp.quantity;
            Ok(())
        })
        .await
    }

    async fn cancel_reservation(&self, wp: &WarehouseProduct) -> LedgerResult<()> {
        self.transaction(|t| {
            let row = t.stock_mut("cancel_reservation", wp.warehouse_id, &wp.code)?;
            if row.reserved_quantity < wp.quantity {
                return Err(LedgerError::InsufficientQuantity {
                    op: "cancel_reservation",
                    warehouse_id: wp.warehouse_id,
                    code: wp.code.clone(),
                    requested: wp.quantity,
                    available: row.reserved_quantity,
                });
            }
            row.reserved_quantity -= wp.quantity;
            row.available_quantity += wp.quantity;
            Ok(())
        })
        .await
    }

    async fn transfer(&self, td: &TransferProduct) -> LedgerResult<()> {
        self.transaction(|t| {
            let source = t.stock_mut("transfer", td.warehouse_from_id, &td.code)?;
            if source.available_quantity < td.quantity {
                return Err(LedgerError::InsufficientQuantity {
                    op: "transfer",
                    warehouse_id: td.warehouse_from_id,
                    code: td.code.clone(),
                    requested: td.quantity,
                    available: source.available_quantity,
                });
            }
            source.available_quantity -= td.quantity;
            t.credit("transfer", td.warehouse_to_id, &td.code, td.quantity)?;
            debug!(code = %td.code, from = td.warehouse_from_id, to = td.warehouse_to_id, quantity = td.quantity, "transfer applied");
            Ok(())
        })
        .await
    }

    async fn add_stock(&self, ad: &AddProduct) -> LedgerResult<()> {
        self.transaction(|t| {
            let product = t
                .products
                .get_mut(&ad.code)
                .ok_or_else(|| LedgerError::not_found("add_stock", PRODUCTS))?;
            product.quantity = product
                .quantity
                .checked_add(ad.quantity)
                .ok_or_else(|| LedgerError::constraint("add_stock", PRODUCTS, "quantity overflow"))?;
            t.credit("add_stock", ad.warehouse_id, &ad.code, ad.quantity)
        })
        .await
    }

    async fn delete_product(&self, dp: &DeleteProduct) -> LedgerResult<Product> {
        self.transaction(|t| {
            let snapshot = t
                .products
                .remove(&dp.code)
                .ok_or_else(|| LedgerError::not_found("delete_product", PRODUCTS))?;
            // Mirrors ON DELETE CASCADE on warehouse_products.product_code.
            t.stock.retain(|(_, code), _| code != &dp.code);
            Ok(snapshot)
        })
        .await
    }
}

#[async_trait]
impl WarehouseLedger for MemoryLedger {
    async fn create_warehouse(&self, warehouse: &NewWarehouse) -> LedgerResult<Warehouse> {
        self.transaction(|t| {
            let id = t.next_warehouse_id;
            t.next_warehouse_id += 1;
            let created = Warehouse {
                id,
                name: warehouse.name.clone(),
                availability: warehouse.availability,
            };
            t.warehouses.insert(id, created.clone());
            Ok(created)
        })
        .await
    }

    async fn list_available_stock(&self, gw: &GetFromWarehouse) -> LedgerResult<Vec<Product>> {
        let tables = self.tables.lock().await;
        let open = tables
            .warehouses
            .get(&gw.warehouse_id)
            .is_some_and(|w| w.availability);
        if !open {
            return Err(LedgerError::not_found("list_available_stock", STOCK));
        }

        let leftovers: Vec<Product> = tables
            .stock
            .range((gw.warehouse_id, String::new())..)
            .take_while(|((id, _), _)| *id == gw.warehouse_id)
            .filter(|(_, level)| level.available_quantity > 0)
            .filter_map(|((_, code), level)| {
                tables.products.get(code).map(|p| Product {
                    name: p.name.clone(),
                    size: p.size.clone(),
                    code: p.code.clone(),
                    quantity: level.available_quantity,
                })
            })
            .collect();

        if leftovers.is_empty() {
            return Err(LedgerError::not_found("list_available_stock", STOCK));
        }
        Ok(leftovers)
    }
}
