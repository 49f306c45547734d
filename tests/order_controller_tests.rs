mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use rustorders::{auth, routes, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{response_json, test_state, TEST_SECRET};

fn token(user: &str) -> String {
    auth::make_jwt_with_minutes(TEST_SECRET, user, 30).unwrap()
}

async fn call(state: &AppState, method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(u) = user {
        req = req.header(header::AUTHORIZATION, format!("Bearer {}", token(u)));
    }
    let req = match body {
        Some(b) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let res = routes::app(state.clone()).oneshot(req).await.unwrap();
    let status = res.status();
    (status, response_json(res).await)
}

async fn place(state: &AppState, user: &str, symbol: &str, kind: &str, qty: i64) -> (StatusCode, Value) {
    call(
        state,
        "POST",
        "/orders",
        Some(user),
        Some(json!({ "symbol": symbol, "order_type": kind, "quantity": qty })),
    )
    .await
}

#[tokio::test]
async fn health_is_public() {
    let state = test_state(150.0);
    let (status, body) = call(&state, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 200);
}

#[tokio::test]
async fn missing_token_returns_401_envelope() {
    let state = test_state(150.0);
    let (status, body) = call(
        &state,
        "POST",
        "/orders",
        None,
        Some(json!({ "symbol": "AAPL", "order_type": "BUY", "quantity": 1 })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);
    assert!(body.get("payload").is_none());
}

#[tokio::test]
async fn bad_and_expired_tokens_are_rejected() {
    let state = test_state(150.0);

    let expired = auth::make_jwt_with_minutes(TEST_SECRET, "u1", -10).unwrap();
    let forged = auth::make_jwt_with_minutes("other-secret", "u1", 30).unwrap();

    for tok in [expired, forged, "garbage".to_string()] {
        let req = Request::builder()
            .uri("/orders")
            .header(header::AUTHORIZATION, tok)
            .body(Body::empty())
            .unwrap();
        let res = routes::app(state.clone()).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn raw_token_without_bearer_prefix_is_accepted() {
    let state = test_state(150.0);

    let req = Request::builder()
        .uri("/orders")
        .header(header::AUTHORIZATION, token("u1"))
        .body(Body::empty())
        .unwrap();
    let res = routes::app(state).oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn place_order_returns_201_with_frozen_total() {
    let state = test_state(150.0);
    let (status, body) = place(&state, "u1", "aapl", "buy", 10).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["code"], 201);
    assert_eq!(body["message"], "Created");

    let order = &body["payload"];
    assert_eq!(order["symbol"], "AAPL");
    assert_eq!(order["order_type"], "BUY");
    assert_eq!(order["order_status"], "placed");
    assert_eq!(order["quantity"], 10);
    assert_eq!(order["price_per_stock"].as_f64(), Some(150.0));
    assert_eq!(order["total_price"].as_f64(), Some(1500.0));
}

#[tokio::test]
async fn place_order_validation_errors_are_400() {
    let state = test_state(150.0);

    for (symbol, kind, qty) in [("", "BUY", 1), ("AAPL", "HOLD", 1), ("AAPL", "BUY", 0)] {
        let (status, body) = place(&state, "u1", symbol, kind, qty).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{symbol} {kind} {qty}");
        assert_eq!(body["code"], 400);
    }

    // missing fields reach validation rather than failing body parsing
    let (status, _) = call(&state, "POST", "/orders", Some("u1"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sell_without_holdings_is_400_and_not_stored() {
    let state = test_state(150.0);

    let (status, _) = place(&state, "u1", "AAPL", "SELL", 5).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = call(&state, "GET", "/orders", Some("u1"), None).await;
    assert_eq!(body["payload"]["orders"], json!([]));
}

#[tokio::test]
async fn cancel_someone_elses_order_is_401_and_unchanged() {
    let state = test_state(150.0);
    let (_, body) = place(&state, "u1", "AAPL", "BUY", 1).await;
    let id = body["payload"]["order_id"].as_str().unwrap().to_string();

    let (status, body) = call(&state, "POST", &format!("/orders/{id}/cancel"), Some("u2"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "can't cancel order which is not yours");

    let (_, body) = call(&state, "GET", "/orders", Some("u1"), None).await;
    assert_eq!(body["payload"]["orders"][0]["order_status"], "placed");

    let (status, body) = call(&state, "POST", &format!("/orders/{id}/cancel"), Some("u1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["order_status"], "cancelled");
}

#[tokio::test]
async fn cancel_with_bad_or_unknown_id() {
    let state = test_state(150.0);

    let (status, _) = call(&state, "POST", "/orders/12345/cancel", Some("u1"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let unknown = uuid::Uuid::new_v4();
    let (status, body) = call(&state, "POST", &format!("/orders/{unknown}/cancel"), Some("u1"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn complete_then_read_holdings() {
    let state = test_state(150.0);
    let (_, body) = place(&state, "u1", "AAPL", "BUY", 10).await;
    let id = body["payload"]["order_id"].as_str().unwrap().to_string();

    let (status, body) = call(&state, "POST", &format!("/orders/{id}/complete"), Some("u1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "order completed");
    assert_eq!(body["payload"]["order_status"], "completed");

    let (status, body) = call(&state, "GET", "/holdings", Some("u1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["payload"]["holdings"],
        json!([{ "symbol": "AAPL", "quantity": 10, "total_price": 1500.0 }])
    );

    let (status, body) = call(&state, "GET", "/holdings/aapl", Some("u1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["quantity"], 10);

    let (status, _) = call(&state, "GET", "/holdings/MSFT", Some("u1"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // completed orders are terminal for cancellation
    let (status, body) = call(&state, "POST", &format!("/orders/{id}/cancel"), Some("u1"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid state change from completed to cancelled");
}

#[tokio::test]
async fn current_price_is_normalized_and_cached() {
    let state = test_state(150.0);

    let (status, body) = call(&state, "GET", "/prices/aapl", Some("u1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["symbol"], "AAPL");
    assert_eq!(body["payload"]["price"].as_f64(), Some(150.0));

    let (status, _) = call(&state, "GET", "/prices/%20", Some("u1"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route_is_enveloped_404() {
    let state = test_state(150.0);
    let (status, body) = call(&state, "GET", "/nope", Some("u1"), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}
