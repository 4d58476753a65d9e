//! Cart routes

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use crate::domain::value_objects::{CartId, MovieId};
use crate::http::error::ApiError;
use crate::http::extract::{CurrentUser, Path, Query};
use crate::http::schemas::{AddToCartParams, DetailResponse, MessageResponse};
use crate::http::AppState;
use crate::services::CartView;

pub async fn add_to_cart(
    State(s): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(p): Query<AddToCartParams>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let added = s.carts.add_movie(user_id, p.movie_id).await?;
    let message = format!("{} added in cart successfully", added.movie_name);
    Ok((StatusCode::CREATED, Json(MessageResponse { message })))
}

pub async fn get_cart(
    State(s): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(cart_id): Path<CartId>,
) -> Result<Json<CartView>, ApiError> {
    Ok(Json(s.carts.get_cart(user_id, cart_id).await?))
}

pub async fn clear_cart(
    State(s): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(cart_id): Path<CartId>,
) -> Result<Json<DetailResponse>, ApiError> {
    s.carts.clear_cart(user_id, cart_id).await?;
    Ok(Json(DetailResponse { detail: "Cart cleared successfully.".into() }))
}

pub async fn remove_from_cart(
    State(s): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path((cart_id, movie_id)): Path<(CartId, MovieId)>,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed = s.carts.remove_movie(user_id, cart_id, movie_id).await?;
    let message = format!("{} removed from cart id {} successfully", removed.movie_name, removed.cart_id);
    Ok(Json(MessageResponse { message }))
}
