//! Request parameters and response bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::aggregates::{Movie, Order};
use crate::domain::value_objects::{Money, MovieId, OrderId, OrderStatus, Page, UserId, DEFAULT_PER_PAGE};
use crate::http::error::ApiError;
use crate::services::{MoviePage, OrderPage};

fn page_from(page: Option<u32>, per_page: Option<u32>) -> Result<Page, ApiError> {
    Page::new(page.unwrap_or(1), per_page.unwrap_or(DEFAULT_PER_PAGE)).map_err(|e| ApiError::validation(e.to_string()))
}

/// Query strings send `status=` for "no filter".
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub detail: String,
}

// =============================================================================
// Movies
// =============================================================================

#[derive(Debug, Default, Deserialize, Validate)]
pub struct MovieListParams {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 20))]
    pub per_page: Option<u32>,
    pub year: Option<i32>,
    pub min_imdb: Option<f64>,
    pub max_imdb: Option<f64>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub star: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
}

impl MovieListParams {
    pub fn page(&self) -> Result<Page, ApiError> { page_from(self.page, self.per_page) }
}

#[derive(Debug, Serialize)]
pub struct MovieListItem {
    pub id: MovieId,
    pub name: String,
    pub year: i32,
    pub time: i32,
    pub imdb: f64,
    pub price: Money,
}

impl From<Movie> for MovieListItem {
    fn from(m: Movie) -> Self {
        Self { id: m.id, name: m.name, year: m.year, time: m.time, imdb: m.imdb, price: m.price }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieListResponse {
    pub movies: Vec<MovieListItem>,
    pub prev_page: Option<String>,
    pub next_page: Option<String>,
    pub total_pages: u64,
    pub total_items: u64,
}

impl From<MoviePage> for MovieListResponse {
    fn from(p: MoviePage) -> Self {
        Self {
            prev_page: p.page.prev_link("/movies/"),
            next_page: p.page.next_link("/movies/", p.total_items),
            total_pages: p.page.total_pages(p.total_items),
            total_items: p.total_items,
            movies: p.movies.into_iter().map(MovieListItem::from).collect(),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AddToCartParams {
    pub movie_id: MovieId,
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Default, Deserialize, Validate)]
pub struct OrderListParams {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 20))]
    pub per_page: Option<u32>,
    pub status: Option<String>,
    pub user_id: Option<UserId>,
    pub order_date: Option<String>,
}

impl OrderListParams {
    pub fn page(&self) -> Result<Page, ApiError> { page_from(self.page, self.per_page) }

    pub fn into_query(self) -> crate::services::OrderListQuery {
        crate::services::OrderListQuery {
            status: non_empty(self.status),
            user_id: self.user_id,
            order_date: non_empty(self.order_date),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub movie_id: MovieId,
    pub price_at_order: Money,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub items: Vec<OrderItemResponse>,
}

impl From<&Order> for OrderResponse {
    fn from(o: &Order) -> Self {
        Self {
            id: o.id(),
            user_id: o.user_id(),
            created_at: o.created_at(),
            status: o.status(),
            total_amount: o.total_amount(),
            items: o
                .items()
                .iter()
                .map(|i| OrderItemResponse { movie_id: i.movie_id, price_at_order: i.price_at_order })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderWithMoviesResponse {
    pub id: OrderId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub movies: Vec<String>,
}

impl From<&Order> for OrderWithMoviesResponse {
    fn from(o: &Order) -> Self {
        Self {
            id: o.id(),
            user_id: o.user_id(),
            created_at: o.created_at(),
            status: o.status(),
            total_amount: o.total_amount(),
            movies: o.movie_names(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderWithMoviesResponse>,
    pub prev_page: Option<String>,
    pub next_page: Option<String>,
    pub total_pages: u64,
    pub total_items: u64,
}

impl From<OrderPage> for OrderListResponse {
    fn from(p: OrderPage) -> Self {
        Self {
            orders: p.orders.iter().map(OrderWithMoviesResponse::from).collect(),
            prev_page: p.page.prev_link("/orders"),
            next_page: p.page.next_link("/orders", p.total_items),
            total_pages: p.page.total_pages(p.total_items),
            total_items: p.total_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_filters_are_dropped() {
        let params = OrderListParams { status: Some(" ".into()), order_date: Some("2024-01-02".into()), ..Default::default() };
        let query = params.into_query();
        assert_eq!(query.status, None);
        assert_eq!(query.order_date.as_deref(), Some("2024-01-02"));
    }

    #[test]
    fn test_per_page_range_is_validated() {
        let params = OrderListParams { per_page: Some(50), ..Default::default() };
        assert!(params.validate().is_err());
        assert!(OrderListParams::default().validate().is_ok());
    }
}
