use async_trait::async_trait;
use depot_shared::{
    AddProduct, DeleteProduct, GetFromWarehouse, NewWarehouse, Product, TransferProduct,
    Warehouse, WarehouseProduct,
};

use crate::LedgerResult;

/// Storage-level writer of product totals and per-warehouse stock.
///
/// Every method is one atomic transaction: it either commits fully or leaves
/// no trace. Implementations hold no in-process locks; coordination between
/// concurrent callers belongs to the backing store.
#[async_trait]
pub trait ProductLedger: Send + Sync {
    /// Fails with `Constraint` when the code is already taken.
    async fn create_product(&self, product: &Product) -> LedgerResult<()>;

    /// Moves `quantity` from available to reserved.
    async fn reserve(&self, wp: &WarehouseProduct) -> LedgerResult<()>;

    /// Moves `quantity` from reserved back to available.
    async fn cancel_reservation(&self, wp: &WarehouseProduct) -> LedgerResult<()>;

    /// Debits the source row and credits (creating if absent) the destination
    /// row. Rejects with `InsufficientQuantity` before any write.
    async fn transfer(&self, td: &TransferProduct) -> LedgerResult<()>;

    /// Raises the product total and credits the warehouse row by the same amount.
    async fn add_stock(&self, ad: &AddProduct) -> LedgerResult<()>;

    /// Removes the product and returns the row as it was before deletion.
    async fn delete_product(&self, dp: &DeleteProduct) -> LedgerResult<Product>;
}

#[async_trait]
pub trait WarehouseLedger: Send + Sync {
    async fn create_warehouse(&self, warehouse: &NewWarehouse) -> LedgerResult<Warehouse>;

    /// Products with positive available stock at an available warehouse.
    /// An empty listing is reported as `NotFound`.
    async fn list_available_stock(&self, gw: &GetFromWarehouse) -> LedgerResult<Vec<Product>>;
}
