use std::sync::Arc;

use async_trait::async_trait;
use depot_shared::{
    AddProduct, DeleteProduct, GetFromWarehouse, NewWarehouse, Product, ReservationStatus,
    TransferProduct, Warehouse, WarehouseProduct,
};

use crate::repository::{ProductLedger, WarehouseLedger};
use crate::LedgerResult;

/// Business actions on products. Each call performs exactly one ledger
/// transaction and hands its error back unchanged.
#[async_trait]
pub trait ProductOperations: Send + Sync {
    async fn create(&self, product: Product) -> LedgerResult<Product>;
    async fn reserve(&self, wp: WarehouseProduct) -> LedgerResult<WarehouseProduct>;
    async fn cancel_reservation(&self, wp: WarehouseProduct) -> LedgerResult<WarehouseProduct>;
    async fn transfer(&self, td: TransferProduct) -> LedgerResult<TransferProduct>;
    async fn add(&self, ad: AddProduct) -> LedgerResult<AddProduct>;
    async fn delete(&self, dp: DeleteProduct) -> LedgerResult<Product>;
}

#[async_trait]
pub trait WarehouseOperations: Send + Sync {
    async fn create(&self, warehouse: NewWarehouse) -> LedgerResult<Warehouse>;
    async fn get_leftovers(&self, gw: GetFromWarehouse) -> LedgerResult<Vec<Product>>;
}

pub struct ProductService {
    ledger: Arc<dyn ProductLedger>,
}

impl ProductService {
    pub fn new(ledger: Arc<dyn ProductLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl ProductOperations for ProductService {
    async fn create(&self, product: Product) -> LedgerResult<Product> {
        self.ledger.create_product(&product).await?;
        Ok(product)
    }

    async fn reserve(&self, wp: WarehouseProduct) -> LedgerResult<WarehouseProduct> {
        self.ledger.reserve(&wp).await?;
        Ok(wp.with_status(ReservationStatus::Reserved))
    }

    async fn cancel_reservation(&self, wp: WarehouseProduct) -> LedgerResult<WarehouseProduct> {
        self.ledger.cancel_reservation(&wp).await?;
        Ok(wp.with_status(ReservationStatus::Canceled))
    }

    async fn transfer(&self, td: TransferProduct) -> LedgerResult<TransferProduct> {
        self.ledger.transfer(&td).await?;
        Ok(td)
    }

    async fn add(&self, ad: AddProduct) -> LedgerResult<AddProduct> {
        self.ledger.add_stock(&ad).await?;
        Ok(ad)
    }

    async fn delete(&self, dp: DeleteProduct) -> LedgerResult<Product> {
        self.ledger.delete_product(&dp).await
    }
}

pub struct WarehouseService {
    ledger: Arc<dyn WarehouseLedger>,
}

impl WarehouseService {
    pub fn new(ledger: Arc<dyn WarehouseLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl WarehouseOperations for WarehouseService {
    async fn create(&self, warehouse: NewWarehouse) -> LedgerResult<Warehouse> {
        self.ledger.create_warehouse(&warehouse).await
    }

    async fn get_leftovers(&self, gw: GetFromWarehouse) -> LedgerResult<Vec<Product>> {
        self.ledger.list_available_stock(&gw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LedgerError, MemoryLedger};

    /// Fails every call, so reaching it shows up as a `Store` error.
    struct UnreachableLedger;

    #[async_trait]
    impl ProductLedger for UnreachableLedger {
        async fn create_product(&self, _: &Product) -> LedgerResult<()> {
            Err(LedgerError::store("create_product", "products", "unreachable"))
        }
        async fn reserve(&self, _: &WarehouseProduct) -> LedgerResult<()> {
            Err(LedgerError::store("reserve", "warehouse_products", "unreachable"))
        }
        async fn cancel_reservation(&self, _: &WarehouseProduct) -> LedgerResult<()> {
            Err(LedgerError::store("cancel_reservation", "warehouse_products", "unreachable"))
        }
        async fn transfer(&self, _: &TransferProduct) -> LedgerResult<()> {
            Err(LedgerError::store("transfer", "warehouse_products", "unreachable"))
        }
        async fn add_stock(&self, _: &AddProduct) -> LedgerResult<()> {
            Err(LedgerError::store("add_stock", "products", "unreachable"))
        }
        async fn delete_product(&self, _: &DeleteProduct) -> LedgerResult<Product> {
            Err(LedgerError::store("delete_product", "products", "unreachable"))
        }
    }

    fn wp(quantity: u64) -> WarehouseProduct {
        WarehouseProduct {
            warehouse_id: 1,
            code: "SKU-1".to_string(),
            quantity,
            status: None,
        }
    }

    async fn seeded() -> (Arc<MemoryLedger>, ProductService) {
        let ledger = Arc::new(MemoryLedger::new());
        let warehouses = WarehouseService::new(ledger.clone());
        warehouses
            .create(NewWarehouse {
                name: "north".to_string(),
                availability: true,
            })
            .await
            .unwrap();

        let products = ProductService::new(ledger.clone());
        products
            .create(Product {
                name: "Boots".to_string(),
                size: "42".to_string(),
                code: "SKU-1".to_string(),
                quantity: 0,
            })
            .await
            .unwrap();
        products
            .add(AddProduct {
                code: "SKU-1".to_string(),
                quantity: 10,
                warehouse_id: 1,
            })
            .await
            .unwrap();

        (ledger, products)
    }

    #[tokio::test]
    async fn test_reserve_and_cancel_are_tagged() {
        let (_, products) = seeded().await;

        let reserved = products.reserve(wp(4)).await.unwrap();
        assert_eq!(reserved.status, Some(ReservationStatus::Reserved));

        let canceled = products.cancel_reservation(wp(4)).await.unwrap();
        assert_eq!(canceled.status, Some(ReservationStatus::Canceled));
    }

    #[tokio::test]
    async fn test_failed_reserve_is_not_tagged() {
        let (_, products) = seeded().await;

        let err = products.reserve(wp(11)).await.unwrap_err();
        assert!(err.is_insufficient());
    }

    #[tokio::test]
    async fn test_edge_requests_are_forwarded_to_the_ledger() {
        let (ledger, products) = seeded().await;

        let reserved = products.reserve(wp(0)).await.unwrap();
        assert_eq!(reserved.status, Some(ReservationStatus::Reserved));

        // Debit and credit land on the same row.
        let moved = products
            .transfer(TransferProduct {
                warehouse_from_id: 1,
                warehouse_to_id: 1,
                code: "SKU-1".to_string(),
                quantity: 2,
            })
            .await
            .unwrap();
        assert_eq!(moved.quantity, 2);
        assert_eq!(ledger.stock(1, "SKU-1").await.unwrap().available_quantity, 10);

        let blank = products
            .create(Product {
                name: "Blank".to_string(),
                size: "0".to_string(),
                code: String::new(),
                quantity: 0,
            })
            .await
            .unwrap();
        assert_eq!(blank.code, "");
    }

    #[tokio::test]
    async fn test_self_transfer_still_checks_available_stock() {
        let (ledger, products) = seeded().await;

        let err = products
            .transfer(TransferProduct {
                warehouse_from_id: 1,
                warehouse_to_id: 1,
                code: "SKU-1".to_string(),
                quantity: 11,
            })
            .await
            .unwrap_err();
        assert!(err.is_insufficient());
        assert_eq!(ledger.stock(1, "SKU-1").await.unwrap().available_quantity, 10);
    }

    #[tokio::test]
    async fn test_ledger_errors_pass_through_unchanged() {
        let products = ProductService::new(Arc::new(UnreachableLedger));

        let err = products
            .add(AddProduct {
                code: "SKU-1".to_string(),
                quantity: 1,
                warehouse_id: 1,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "add_stock: store failure on products: unreachable");
    }

    #[tokio::test]
    async fn test_delete_returns_snapshot() {
        let (_, products) = seeded().await;

        let snapshot = products
            .delete(DeleteProduct {
                code: "SKU-1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(snapshot.name, "Boots");
        assert_eq!(snapshot.quantity, 10);
    }
}
