use depot_shared::{GetFromWarehouse, NewWarehouse};
use serde_json::Value;

use crate::batch::apply_all;
use crate::error::RpcError;
use crate::rpc::{decode, encode};
use crate::state::AppState;

pub(crate) async fn dispatch(state: &AppState, name: &str, params: Value) -> Result<Value, RpcError> {
    let ops = &state.warehouses;

    match name {
        "Create" => {
            const METHOD: &str = "Warehouses.Create";
            let items: Vec<NewWarehouse> = decode(METHOD, params)?;
            encode(apply_all(METHOD, items, |w| ops.create(w)).await?)
        }
        // Single request, single listing; not a batch.
        "GetLeftOvers" => {
            const METHOD: &str = "Warehouses.GetLeftOvers";
            let gw: GetFromWarehouse = decode(METHOD, params)?;
            let leftovers = ops
                .get_leftovers(gw)
                .await
                .map_err(|source| RpcError::Call {
                    method: METHOD,
                    source,
                })?;
            encode(leftovers)
        }
        _ => Err(RpcError::UnknownMethod(format!("Warehouses.{}", name))),
    }
}
