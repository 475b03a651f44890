use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use depot_api::{app, rpc::RpcResponse, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn post_raw(app: &Router, body: Vec<u8>) -> RpcResponse {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn call(app: &Router, method: &str, payload: Value) -> RpcResponse {
    let body = json!({ "method": method, "params": [payload], "id": 7 });
    post_raw(app, serde_json::to_vec(&body).unwrap()).await
}

fn product(code: &str) -> Value {
    json!({ "name": "Boots", "size": "42", "code": code, "quantity": 0 })
}

/// Two available warehouses and product `SKU` with 10 units in warehouse 1.
async fn stocked_app() -> Router {
    let app = app(AppState::in_memory());

    let created = call(
        &app,
        "Warehouses.Create",
        json!([
            { "name": "north", "availability": true },
            { "name": "south", "availability": true }
        ]),
    )
    .await;
    assert_eq!(created.error, None);
    assert_eq!(created.result[0]["id"], 1);
    assert_eq!(created.result[1]["id"], 2);

    let res = call(&app, "Products.Create", json!([product("SKU")])).await;
    assert_eq!(res.error, None);

    let res = call(
        &app,
        "Products.Add",
        json!([{ "code": "SKU", "quantity": 10, "warehouse_id": 1 }]),
    )
    .await;
    assert_eq!(res.error, None);

    app
}

#[tokio::test]
async fn test_create_batch_skips_duplicate_and_keeps_order() {
    let app = app(AppState::in_memory());

    let res = call(
        &app,
        "Products.Create",
        json!([product("A"), product("A"), product("C")]),
    )
    .await;

    assert_eq!(res.id, 7);
    assert_eq!(res.error, None);
    let codes: Vec<&str> = res
        .result
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["A", "C"]);
}

#[tokio::test]
async fn test_batch_where_every_item_fails() {
    let app = stocked_app().await;

    let res = call(
        &app,
        "Products.Create",
        json!([product("SKU"), product("SKU"), product("SKU")]),
    )
    .await;

    assert_eq!(res.result, Value::Null);
    let error = res.error.unwrap();
    assert!(error.starts_with("Products.Create: all 3 calls returned errors"), "{}", error);
    assert!(error.contains("constraint violated on products"), "{}", error);
}

#[tokio::test]
async fn test_empty_batch_is_an_error() {
    let app = stocked_app().await;

    let res = call(&app, "Products.Create", json!([])).await;

    assert_eq!(res.result, Value::Null);
    let error = res.error.unwrap();
    assert!(error.starts_with("Products.Create: all 0 calls returned errors"), "{}", error);
}

#[tokio::test]
async fn test_edge_requests_go_straight_to_the_ledger() {
    let app = stocked_app().await;

    let res = call(&app, "Products.Create", json!([product("")])).await;
    assert_eq!(res.error, None);
    assert_eq!(res.result[0]["code"], "");

    let res = call(
        &app,
        "Products.Reserve",
        json!([{ "warehouse_id": 1, "code": "SKU", "quantity": 0 }]),
    )
    .await;
    assert_eq!(res.error, None);
    assert_eq!(res.result[0]["status"], "reserved");

    let res = call(
        &app,
        "Products.Transfer",
        json!([{ "warehouse_from_id": 1, "warehouse_to_id": 1, "code": "SKU", "quantity": 2 }]),
    )
    .await;
    assert_eq!(res.error, None);

    let res = call(&app, "Warehouses.GetLeftOvers", json!({ "warehouse_id": 1 })).await;
    assert_eq!(res.error, None);
    assert_eq!(res.result[0]["quantity"], 10);
}

#[tokio::test]
async fn test_reserve_and_cancel_are_tagged_over_the_wire() {
    let app = stocked_app().await;
    let item = json!({ "warehouse_id": 1, "code": "SKU", "quantity": 4 });

    let res = call(&app, "Products.Reserve", json!([item.clone()])).await;
    assert_eq!(res.error, None);
    assert_eq!(res.result[0]["status"], "reserved");

    let res = call(&app, "Products.CancelReservation", json!([item])).await;
    assert_eq!(res.error, None);
    assert_eq!(res.result[0]["status"], "canceled");

    let res = call(&app, "Warehouses.GetLeftOvers", json!({ "warehouse_id": 1 })).await;
    assert_eq!(res.result[0]["quantity"], 10);
}

#[tokio::test]
async fn test_transfer_then_leftovers() {
    let app = stocked_app().await;

    let res = call(
        &app,
        "Products.Transfer",
        json!([
            { "warehouse_from_id": 1, "warehouse_to_id": 2, "code": "SKU", "quantity": 6 },
            { "warehouse_from_id": 1, "warehouse_to_id": 2, "code": "SKU", "quantity": 6 }
        ]),
    )
    .await;
    assert_eq!(res.error, None);
    assert_eq!(res.result.as_array().unwrap().len(), 1);

    let north = call(&app, "Warehouses.GetLeftOvers", json!({ "warehouse_id": 1 })).await;
    let south = call(&app, "Warehouses.GetLeftOvers", json!({ "warehouse_id": 2 })).await;
    assert_eq!(north.result, json!([{ "name": "Boots", "size": "42", "code": "SKU", "quantity": 4 }]));
    assert_eq!(south.result, json!([{ "name": "Boots", "size": "42", "code": "SKU", "quantity": 6 }]));
}

#[tokio::test]
async fn test_insufficient_transfer_is_reported() {
    let app = stocked_app().await;

    let res = call(
        &app,
        "Products.Transfer",
        json!([{ "warehouse_from_id": 1, "warehouse_to_id": 2, "code": "SKU", "quantity": 11 }]),
    )
    .await;

    let error = res.error.unwrap();
    assert!(error.contains("not enough quantity"), "{}", error);

    let north = call(&app, "Warehouses.GetLeftOvers", json!({ "warehouse_id": 1 })).await;
    assert_eq!(north.result[0]["quantity"], 10);
}

#[tokio::test]
async fn test_delete_returns_snapshots() {
    let app = stocked_app().await;

    let res = call(&app, "Products.Delete", json!([{ "code": "SKU" }, { "code": "missing" }])).await;
    assert_eq!(res.error, None);
    assert_eq!(res.result, json!([{ "name": "Boots", "size": "42", "code": "SKU", "quantity": 10 }]));

    let res = call(&app, "Products.Delete", json!([{ "code": "SKU" }])).await;
    assert!(res.error.unwrap().contains("no matching row in products"));
}

#[tokio::test]
async fn test_empty_leftovers_is_an_error() {
    let app = stocked_app().await;

    let res = call(&app, "Warehouses.GetLeftOvers", json!({ "warehouse_id": 2 })).await;
    assert_eq!(res.result, Value::Null);
    assert!(res.error.unwrap().starts_with("Warehouses.GetLeftOvers:"));
}

#[tokio::test]
async fn test_transport_errors_use_the_envelope() {
    let app = app(AppState::in_memory());

    let res = post_raw(&app, b"{not json".to_vec()).await;
    assert_eq!(res.id, Value::Null);
    assert!(res.error.unwrap().starts_with("invalid request"));

    let res = call(&app, "Products.Teleport", json!([])).await;
    assert_eq!(res.error.as_deref(), Some("rpc: can't find method Products.Teleport"));

    let res = call(&app, "Products.Reserve", json!({ "warehouse_id": "one" })).await;
    assert!(res.error.unwrap().starts_with("Products.Reserve: invalid params"));
}

#[tokio::test]
async fn test_health_without_database() {
    let app = app(AppState::in_memory());

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}
