use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

pub mod batch;
pub mod error;
mod products;
pub mod rpc;
pub mod state;
mod warehouses;

pub use error::RpcError;
pub use state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", post(rpc::handle))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    if let Some(db) = &state.db {
        if let Err(err) = db.ping().await {
            tracing::warn!(error = %err, "health check failed");
            return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "unavailable" })));
        }
    }

    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
