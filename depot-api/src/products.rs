use depot_shared::{AddProduct, DeleteProduct, Product, TransferProduct, WarehouseProduct};
use serde_json::Value;

use crate::batch::apply_all;
use crate::error::RpcError;
use crate::rpc::{decode, encode};
use crate::state::AppState;

/// `Products.*` methods. Every one takes a list and runs as a batch.
pub(crate) async fn dispatch(state: &AppState, name: &str, params: Value) -> Result<Value, RpcError> {
    let ops = &state.products;

    match name {
        "Create" => {
            const METHOD: &str = "Products.Create";
            let items: Vec<Product> = decode(METHOD, params)?;
            encode(apply_all(METHOD, items, |p| ops.create(p)).await?)
        }
        "Reserve" => {
            const METHOD: &str = "Products.Reserve";
            let items: Vec<WarehouseProduct> = decode(METHOD, params)?;
            encode(apply_all(METHOD, items, |wp| ops.reserve(wp)).await?)
        }
        "CancelReservation" => {
            const METHOD: &str = "Products.CancelReservation";
            let items: Vec<WarehouseProduct> = decode(METHOD, params)?;
            encode(apply_all(METHOD, items, |wp| ops.cancel_reservation(wp)).await?)
        }
        "Transfer" => {
            const METHOD: &str = "Products.Transfer";
            let items: Vec<TransferProduct> = decode(METHOD, params)?;
            encode(apply_all(METHOD, items, |td| ops.transfer(td)).await?)
        }
        "Add" => {
            const METHOD: &str = "Products.Add";
            let items: Vec<AddProduct> = decode(METHOD, params)?;
            encode(apply_all(METHOD, items, |ad| ops.add(ad)).await?)
        }
        "Delete" => {
            const METHOD: &str = "Products.Delete";
            let items: Vec<DeleteProduct> = decode(METHOD, params)?;
            encode(apply_all(METHOD, items, |dp| ops.delete(dp)).await?)
        }
        _ => Err(RpcError::UnknownMethod(format!("Products.{}", name))),
    }
}
