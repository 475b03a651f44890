//! JSON-RPC 1.0 envelope over HTTP POST.
//!
//! `{"method": "Products.Reserve", "params": [[...]], "id": 1}` in,
//! `{"id": 1, "result": ..., "error": null}` out. RPC-level failures travel
//! in `error` with status 200.

use axum::{body::Bytes, extract::State, Json};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::error::RpcError;
use crate::state::AppState;
use crate::{products, warehouses};

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcResponse {
    pub id: Value,
    pub result: Value,
    pub error: Option<String>,
}

impl RpcResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            id,
            result,
            error: None,
        }
    }

    fn failure(id: Value, err: &RpcError) -> Self {
        Self {
            id,
            result: Value::Null,
            error: Some(err.to_string()),
        }
    }
}

pub async fn handle(State(state): State<AppState>, body: Bytes) -> Json<RpcResponse> {
    let request: RpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            let err = RpcError::Parse(err);
            info!(error = %err, "rejected rpc request");
            return Json(RpcResponse::failure(Value::Null, &err));
        }
    };

    match dispatch(&state, &request.method, request.params).await {
        Ok(result) => Json(RpcResponse::success(request.id, result)),
        Err(err) => {
            if err.is_internal() {
                error!(method = %request.method, error = %err, "rpc call failed");
            } else {
                info!(method = %request.method, error = %err, "rpc call failed");
            }
            Json(RpcResponse::failure(request.id, &err))
        }
    }
}

/// Routes `Service.Method` names to the service handlers.
pub async fn dispatch(state: &AppState, method: &str, params: Value) -> Result<Value, RpcError> {
    match method.split_once('.') {
        Some(("Products", name)) => products::dispatch(state, name, params).await,
        Some(("Warehouses", name)) => warehouses::dispatch(state, name, params).await,
        _ => Err(RpcError::UnknownMethod(method.to_string())),
    }
}

/// Decodes the payload of a call. `params` is normally a one-element array
/// wrapping the payload; a bare payload is accepted as well.
pub(crate) fn decode<T: DeserializeOwned>(method: &str, params: Value) -> Result<T, RpcError> {
    if let Value::Array(items) = &params {
        if items.len() == 1 {
            if let Ok(payload) = T::deserialize(&items[0]) {
                return Ok(payload);
            }
        }
    }

    serde_json::from_value(params).map_err(|source| RpcError::InvalidParams {
        method: method.to_string(),
        source,
    })
}

pub(crate) fn encode<T: Serialize>(value: T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(RpcError::Encode)
}
