//! Order routes

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;
use crate::domain::value_objects::OrderId;
use crate::http::error::ApiError;
use crate::http::extract::{CurrentUser, Path, Query};
use crate::http::schemas::{OrderListParams, OrderListResponse, OrderResponse, OrderWithMoviesResponse, StatusParams};
use crate::http::AppState;

pub async fn list_orders(
    State(s): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(p): Query<OrderListParams>,
) -> Result<Json<OrderListResponse>, ApiError> {
    p.validate()?;
    let page = p.page()?;
    let orders = s.orders.list_orders(user_id, p.into_query(), page).await?;
    Ok(Json(orders.into()))
}

pub async fn create_order(
    State(s): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let order = s.orders.create_order(user_id).await?;
    Ok((StatusCode::CREATED, Json(OrderResponse::from(&order))))
}

pub async fn get_order(
    State(s): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderWithMoviesResponse>, ApiError> {
    let order = s.orders.get_order(user_id, order_id).await?;
    Ok(Json(OrderWithMoviesResponse::from(&order)))
}

pub async fn update_order_status(
    State(s): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(order_id): Path<OrderId>,
    Query(p): Query<StatusParams>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = s.orders.update_status(user_id, order_id, &p.status).await?;
    Ok(Json(OrderResponse::from(&order)))
}

pub async fn delete_order(
    State(s): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(order_id): Path<OrderId>,
) -> Result<StatusCode, ApiError> {
    s.orders.delete_order(user_id, order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn cancel_order(
    State(s): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = s.orders.cancel_order(user_id, order_id).await?;
    Ok(Json(OrderResponse::from(&order)))
}
