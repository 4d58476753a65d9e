//! HTTP surface

pub mod carts;
pub mod error;
pub mod extract;
pub mod movies;
pub mod orders;
pub mod schemas;

use axum::{routing::{delete, get, post, put}, Json, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::notify::Notifier;
use crate::services::{CartService, CatalogService, OrderService};
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub carts: CartService,
    pub orders: OrderService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            catalog: CatalogService::new(Arc::clone(&store)),
            carts: CartService::new(Arc::clone(&store), notifier),
            orders: OrderService::new(store),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "cinema-storefront"})) }))
        .route("/movies/", get(movies::list_movies))
        .route("/cart/", post(carts::add_to_cart))
        .route("/cart/:cart_id/", get(carts::get_cart))
        .route("/cart/:cart_id/clear/", delete(carts::clear_cart))
        .route("/cart/:cart_id/:movie_id/", delete(carts::remove_from_cart))
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route("/orders/:order_id", get(orders::get_order).put(orders::update_order_status).delete(orders::delete_order))
        .route("/orders/:order_id/cancel", put(orders::cancel_order))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
