mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use common::{Fixture, RecordingNotifier};
use cinema_storefront::http::{router, AppState};
use cinema_storefront::store::Store;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn app(fx: &Fixture) -> Router {
    let (notifier, _rx) = RecordingNotifier::new();
    let store: Arc<dyn Store> = Arc::new(fx.store.clone());
    router(AppState::new(store, notifier))
}

async fn call(app: &Router, method: Method, uri: &str, user: Option<i64>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(id) = user {
        req = req.header("x-user-id", id.to_string());
    }
    let res = app.clone().oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let fx = Fixture::new();
    let (status, body) = call(&app(&fx), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "cinema-storefront");
}

#[tokio::test]
async fn test_missing_identity_is_401() {
    let fx = Fixture::new();
    let (status, body) = call(&app(&fx), Method::POST, "/orders", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Not authenticated");
}

#[tokio::test]
async fn test_cart_to_order_flow() {
    let fx = Fixture::new();
    let app = app(&fx);
    let alice = Some(fx.alice.value());

    let uri = format!("/cart/?movie_id={}", fx.matrix);
    let (status, body) = call(&app, Method::POST, &uri, alice).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "The Matrix added in cart successfully");

    let (status, body) = call(&app, Method::POST, &uri, alice).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Movie is already in the cart.");

    let (status, body) = call(&app, Method::POST, "/orders", alice).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    let order_id = body["id"].as_i64().unwrap();

    let (status, body) = call(&app, Method::GET, &format!("/orders/{order_id}"), alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["movies"][0], "The Matrix");

    let (status, body) = call(&app, Method::POST, "/orders", alice).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "You have unpaid order");

    let (status, _) = call(&app, Method::DELETE, &format!("/orders/{order_id}"), alice).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_cart_routes() {
    let fx = Fixture::new();
    let app = app(&fx);
    let alice = Some(fx.alice.value());
    let cart_id = fx.carts.add_movie(fx.alice, fx.alien).await.unwrap().cart_id;

    let (status, body) = call(&app, Method::GET, &format!("/cart/{cart_id}/"), alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["title"], "Alien");

    let (status, _) = call(&app, Method::GET, &format!("/cart/{cart_id}/"), Some(fx.bob.value())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/cart/{cart_id}/{}/", fx.alien);
    let (status, body) = call(&app, Method::DELETE, &uri, alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("Alien removed from cart id {cart_id} successfully"));

    let (status, body) = call(&app, Method::DELETE, &format!("/cart/{cart_id}/clear/"), alice).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Cart is already empty.");
}

#[tokio::test]
async fn test_order_status_routes() {
    let fx = Fixture::new();
    let app = app(&fx);
    let order = fx.place(fx.alice, &[fx.matrix]).await;
    let alice = Some(fx.alice.value());

    let uri = format!("/orders/{}?status=shipped", order.id());
    let (status, body) = call(&app, Method::PUT, &uri, alice).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid status");

    let (status, body) = call(&app, Method::PUT, &format!("/orders/{}/cancel", order.id()), alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (status, body) = call(&app, Method::GET, &format!("/orders/{}", order.id()), alice).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Order is cancelled and cannot be accessed");
}

#[tokio::test]
async fn test_order_listing_routes() {
    let fx = Fixture::new();
    let app = app(&fx);
    fx.place(fx.alice, &[fx.matrix]).await;

    let (status, _) = call(&app, Method::GET, "/orders?status=paid", Some(fx.alice.value())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, Method::GET, "/orders?per_page=50", Some(fx.alice.value())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = call(&app, Method::GET, "/orders?page=1&per_page=1", Some(fx.admin.value())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["total_pages"], 1);
    assert!(body["next_page"].is_null());
    assert!(body["prev_page"].is_null());
}

#[tokio::test]
async fn test_movie_listing() {
    let fx = Fixture::new();
    let app = app(&fx);

    let (status, body) = call(&app, Method::GET, "/movies/?per_page=1&sort_by=year", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["movies"][0]["name"], "The Matrix");
    assert_eq!(body["total_items"], 2);
    assert_eq!(body["next_page"], "/movies/?page=2&per_page=1");

    let (status, body) = call(&app, Method::GET, "/movies/?genre=horror", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["movies"][0]["name"], "Alien");

    let (status, body) = call(&app, Method::GET, "/movies/?star=nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "No movies found.");
}

#[tokio::test]
async fn test_malformed_params_get_json_detail() {
    let fx = Fixture::new();
    let app = app(&fx);
    let order = fx.place(fx.alice, &[fx.matrix]).await;
    let alice = Some(fx.alice.value());

    let (status, body) = call(&app, Method::PUT, &format!("/orders/{}", order.id()), alice).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("status"));

    let (status, body) = call(&app, Method::GET, "/orders/abc", alice).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());

    let (status, body) = call(&app, Method::POST, "/cart/?movie_id=x", alice).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());

    let (status, body) = call(&app, Method::POST, "/cart/?movie_id=999", alice).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Movie not found");
}
