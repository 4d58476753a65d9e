//! Persistence gateway
//!
//! [`Store`] is the only way services touch storage. Every method that writes
//! more than one row runs as a single transaction: either all of its effects
//! become visible or none do.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use crate::domain::aggregates::{Cart, CartLine, Movie, MovieFilter, Order, User};
use crate::domain::value_objects::{CartId, MovieId, OrderId, OrderStatus, Page, UserId};
use crate::Result;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Filters for the order listing. `None` means "do not filter".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderFilter {
    pub user_id: Option<UserId>,
    pub status: Option<OrderStatus>,
    /// Half-open `[start, end)` window on `created_at`.
    pub created: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl OrderFilter {
    /// Restricts to orders created on `date` in the server's local timezone.
    pub fn on_date(mut self, date: NaiveDate) -> Self {
        let start = local_midnight(date);
        let end = date.succ_opt().map(local_midnight).unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.created = Some((start, end));
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.user_id.map_or(true, |u| order.user_id() == u)
            && self.status.map_or(true, |s| order.status() == s)
            && self.created.map_or(true, |(start, end)| order.created_at() >= start && order.created_at() < end)
    }
}

fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user(&self, id: UserId) -> Result<Option<User>>;
    async fn moderators(&self) -> Result<Vec<User>>;

    async fn find_movie(&self, id: MovieId) -> Result<Option<Movie>>;
    /// One page of matching movies plus the total match count.
    async fn list_movies(&self, filter: &MovieFilter, page: Page) -> Result<(Vec<Movie>, u64)>;
    async fn has_purchased(&self, user_id: UserId, movie_id: MovieId) -> Result<bool>;

    async fn find_cart(&self, id: CartId) -> Result<Option<Cart>>;
    /// Items of a cart joined with movie title, price, year and genre names.
    async fn cart_lines(&self, id: CartId) -> Result<Vec<CartLine>>;
    /// Creates the user's cart if needed and adds the movie to it.
    /// Fails with `BadRequest` if the movie is already in the cart.
    async fn add_cart_item(&self, user_id: UserId, movie_id: MovieId) -> Result<CartId>;
    /// Returns whether an item was removed.
    async fn remove_cart_item(&self, cart_id: CartId, movie_id: MovieId) -> Result<bool>;
    /// Deletes every item but keeps the cart. Returns the number of items deleted.
    async fn clear_cart(&self, cart_id: CartId) -> Result<u64>;

    async fn has_pending_order(&self, user_id: UserId) -> Result<bool>;
    /// Checks out the user's cart in one transaction: prices the movies it
    /// holds at that moment, inserts the order with its items and deletes the
    /// cart. Fails with `BadRequest` if the user already has a pending order
    /// or the cart holds no existing movie.
    async fn place_order(&self, user_id: UserId) -> Result<Order>;
    /// Loads the order with its items and their movie names.
    async fn find_order(&self, id: OrderId) -> Result<Option<Order>>;
    /// Persists the status of an order that was pending when loaded. Moving to
    /// `paid` also records a purchase for every item.
    async fn save_order_status(&self, order: &Order) -> Result<()>;
    /// Deletes a pending order and its items.
    async fn delete_order(&self, id: OrderId) -> Result<()>;
    /// Newest first, with the pre-pagination count.
    async fn list_orders(&self, filter: &OrderFilter, page: Page) -> Result<(Vec<Order>, u64)>;
}
