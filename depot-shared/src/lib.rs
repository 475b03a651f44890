pub mod models;

pub use models::product::{AddProduct, DeleteProduct, Product, ReservationStatus, TransferProduct, WarehouseProduct};
pub use models::warehouse::{GetFromWarehouse, NewWarehouse, Warehouse};
