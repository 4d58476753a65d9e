//! In-memory store
//!
//! Keeps every table behind one mutex, so each [`Store`] call is trivially
//! atomic. Used by the test suite and when the service runs without
//! `DATABASE_URL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use crate::domain::aggregates::movie::contains_ci;
use crate::domain::aggregates::{Cart, CartLine, Movie, MovieFilter, MovieSort, Order, OrderDraft, OrderError, OrderItem, OrderLine, User};
use crate::domain::value_objects::{CartId, Money, MovieId, OrderId, OrderStatus, Page, UserGroup, UserId};
use crate::store::{OrderFilter, Store};
use crate::Result;

/// Catalog entry with its related names, for seeding.
#[derive(Clone, Debug)]
pub struct MovieSeed {
    pub name: String,
    pub year: i32,
    pub time: i32,
    pub imdb: f64,
    pub votes: i32,
    pub description: String,
    pub price: Money,
    pub genres: Vec<String>,
    pub directors: Vec<String>,
    pub stars: Vec<String>,
}

impl MovieSeed {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(), year: 2000, time: 120, imdb: 7.0, votes: 0, description: String::new(),
            price, genres: vec![], directors: vec![], stars: vec![],
        }
    }

    pub fn year(mut self, year: i32) -> Self { self.year = year; self }
    pub fn imdb(mut self, imdb: f64) -> Self { self.imdb = imdb; self }
    pub fn votes(mut self, votes: i32) -> Self { self.votes = votes; self }
    pub fn description(mut self, text: impl Into<String>) -> Self { self.description = text.into(); self }
    pub fn genres(mut self, names: &[&str]) -> Self { self.genres = names.iter().map(|s| s.to_string()).collect(); self }
    pub fn directors(mut self, names: &[&str]) -> Self { self.directors = names.iter().map(|s| s.to_string()).collect(); self }
    pub fn stars(mut self, names: &[&str]) -> Self { self.stars = names.iter().map(|s| s.to_string()).collect(); self }
}

#[derive(Clone, Debug)]
struct MovieRow {
    movie: Movie,
    genres: Vec<String>,
    directors: Vec<String>,
    stars: Vec<String>,
}

impl MovieRow {
    fn matches(&self, f: &MovieFilter) -> bool {
        let m = &self.movie;
        let any = |names: &[String], needle: &str| names.iter().any(|n| contains_ci(n, needle));
        f.year.map_or(true, |y| m.year == y)
            && f.min_imdb.map_or(true, |v| m.imdb >= v)
            && f.max_imdb.map_or(true, |v| m.imdb <= v)
            && f.genre.as_deref().map_or(true, |g| any(&self.genres, g))
            && f.director.as_deref().map_or(true, |d| any(&self.directors, d))
            && f.star.as_deref().map_or(true, |s| any(&self.stars, s))
            && f.search.as_deref().map_or(true, |q| {
                contains_ci(&m.name, q) || contains_ci(&m.description, q) || any(&self.directors, q) || any(&self.stars, q)
            })
    }
}

#[derive(Clone, Debug)]
struct CartRow {
    user_id: UserId,
    items: Vec<MovieId>,
}

#[derive(Clone, Debug)]
struct OrderRow {
    user_id: UserId,
    status: OrderStatus,
    total_amount: Money,
    created_at: DateTime<Utc>,
    lines: Vec<OrderLine>,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    movies: BTreeMap<MovieId, MovieRow>,
    purchases: HashSet<(UserId, MovieId)>,
    carts: BTreeMap<CartId, CartRow>,
    orders: BTreeMap<OrderId, OrderRow>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn load_order(&self, id: OrderId, row: &OrderRow) -> Order {
        let items = row
            .lines
            .iter()
            .map(|l| OrderItem {
                movie_id: l.movie_id,
                movie_name: self.movies.get(&l.movie_id).map(|m| m.movie.name.clone()).unwrap_or_default(),
                price_at_order: l.price_at_order,
            })
            .collect();
        Order::new(id, row.user_id, row.status, row.total_amount, row.created_at, items)
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self { Self::default() }

    fn tables(&self) -> MutexGuard<'_, Tables> { self.tables.lock().unwrap_or_else(PoisonError::into_inner) }

    pub fn add_user(&self, email: impl Into<String>, group: UserGroup) -> UserId {
        let mut t = self.tables();
        let id = UserId(t.next_id());
        t.users.insert(id, User { id, email: email.into(), group });
        id
    }

    pub fn add_movie(&self, seed: MovieSeed) -> MovieId {
        let mut t = self.tables();
        let id = MovieId(t.next_id());
        let movie = Movie {
            id, name: seed.name, year: seed.year, time: seed.time, imdb: seed.imdb, votes: seed.votes,
            description: seed.description, price: seed.price,
        };
        t.movies.insert(id, MovieRow { movie, genres: seed.genres, directors: seed.directors, stars: seed.stars });
        id
    }

    pub fn set_movie_price(&self, id: MovieId, price: Money) {
        if let Some(row) = self.tables().movies.get_mut(&id) { row.movie.price = price; }
    }

    /// Removes a movie; cart items that reference it go with it.
    pub fn remove_movie(&self, id: MovieId) {
        let mut t = self.tables();
        t.movies.remove(&id);
        for cart in t.carts.values_mut() { cart.items.retain(|m| *m != id); }
    }

    pub fn add_purchase(&self, user_id: UserId, movie_id: MovieId) {
        self.tables().purchases.insert((user_id, movie_id));
    }

    pub fn set_order_created_at(&self, id: OrderId, created_at: DateTime<Utc>) {
        if let Some(row) = self.tables().orders.get_mut(&id) { row.created_at = created_at; }
    }

    pub fn cart_count(&self, user_id: UserId) -> usize {
        self.tables().carts.values().filter(|c| c.user_id == user_id).count()
    }

    pub fn order_count(&self, user_id: UserId) -> usize {
        self.tables().orders.values().filter(|o| o.user_id == user_id).count()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.tables().users.get(&id).cloned())
    }

    async fn moderators(&self) -> Result<Vec<User>> {
        Ok(self.tables().users.values().filter(|u| u.group == UserGroup::Moderator).cloned().collect())
    }

    async fn find_movie(&self, id: MovieId) -> Result<Option<Movie>> {
        Ok(self.tables().movies.get(&id).map(|r| r.movie.clone()))
    }

    async fn list_movies(&self, filter: &MovieFilter, page: Page) -> Result<(Vec<Movie>, u64)> {
        let t = self.tables();
        let mut movies: Vec<Movie> = t.movies.values().filter(|r| r.matches(filter)).map(|r| r.movie.clone()).collect();
        match filter.sort {
            Some(MovieSort::Price) => movies.sort_by(|a, b| b.price.cmp(&a.price)),
            Some(MovieSort::Year) => movies.sort_by(|a, b| b.year.cmp(&a.year)),
            Some(MovieSort::Votes) => movies.sort_by(|a, b| b.votes.cmp(&a.votes)),
            None => {}
        }
        let total = movies.len() as u64;
        let page = movies.into_iter().skip(page.offset() as usize).take(page.limit() as usize).collect();
        Ok((page, total))
    }

    async fn has_purchased(&self, user_id: UserId, movie_id: MovieId) -> Result<bool> {
        Ok(self.tables().purchases.contains(&(user_id, movie_id)))
    }

    async fn find_cart(&self, id: CartId) -> Result<Option<Cart>> {
        Ok(self.tables().carts.get(&id).map(|c| Cart::new(id, c.user_id, c.items.iter().copied())))
    }

    async fn cart_lines(&self, id: CartId) -> Result<Vec<CartLine>> {
        let t = self.tables();
        let Some(cart) = t.carts.get(&id) else { return Ok(vec![]) };
        Ok(cart
            .items
            .iter()
            .filter_map(|m| t.movies.get(m))
            .map(|r| CartLine {
                id: r.movie.id,
                title: r.movie.name.clone(),
                price: r.movie.price,
                genre: r.genres.clone(),
                release_year: r.movie.year,
            })
            .collect())
    }

    async fn add_cart_item(&self, user_id: UserId, movie_id: MovieId) -> Result<CartId> {
        let mut t = self.tables();
        let existing = t.carts.iter().find(|(_, c)| c.user_id == user_id).map(|(id, _)| *id);
        let cart_id = match existing {
            Some(id) => id,
            None => {
                let id = CartId(t.next_id());
                t.carts.insert(id, CartRow { user_id, items: vec![] });
                id
            }
        };
        let Some(row) = t.carts.get_mut(&cart_id) else { return Ok(cart_id) };
        let mut cart = Cart::new(cart_id, user_id, row.items.iter().copied());
        cart.add_movie(movie_id)?;
        row.items = cart.movie_ids();
        Ok(cart_id)
    }

    async fn remove_cart_item(&self, cart_id: CartId, movie_id: MovieId) -> Result<bool> {
        let mut t = self.tables();
        let Some(cart) = t.carts.get_mut(&cart_id) else { return Ok(false) };
        let before = cart.items.len();
        cart.items.retain(|m| *m != movie_id);
        Ok(cart.items.len() != before)
    }

    async fn clear_cart(&self, cart_id: CartId) -> Result<u64> {
        let mut t = self.tables();
        Ok(t.carts.get_mut(&cart_id).map_or(0, |c| c.items.drain(..).count() as u64))
    }

    async fn has_pending_order(&self, user_id: UserId) -> Result<bool> {
        Ok(self.tables().orders.values().any(|o| o.user_id == user_id && o.status == OrderStatus::Pending))
    }

    async fn place_order(&self, user_id: UserId) -> Result<Order> {
        let mut t = self.tables();
        if t.orders.values().any(|o| o.user_id == user_id && o.status == OrderStatus::Pending) {
            return Err(OrderError::UnpaidOrder.into());
        }
        let (cart_id, items) = t
            .carts
            .iter()
            .find(|(_, c)| c.user_id == user_id)
            .map(|(id, c)| (*id, c.items.clone()))
            .ok_or(OrderError::EmptyCart)?;
        let movies: Vec<Movie> = items.iter().filter_map(|m| t.movies.get(m)).map(|r| r.movie.clone()).collect();
        let draft = OrderDraft::price(user_id, &movies)?;

        let id = OrderId(t.next_id());
        let row = OrderRow {
            user_id,
            status: OrderStatus::Pending,
            total_amount: draft.total_amount,
            created_at: Utc::now(),
            lines: draft.lines,
        };
        t.carts.remove(&cart_id);
        let order = t.load_order(id, &row);
        t.orders.insert(id, row);
        Ok(order)
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>> {
        let t = self.tables();
        Ok(t.orders.get(&id).map(|row| t.load_order(id, row)))
    }

    async fn save_order_status(&self, order: &Order) -> Result<()> {
        let mut t = self.tables();
        let row = match t.orders.get_mut(&order.id()) {
            Some(row) if row.status == OrderStatus::Pending => row,
            _ => return Err(OrderError::CannotUpdate.into()),
        };
        row.status = order.status();
        if order.status() == OrderStatus::Paid {
            let bought: Vec<(UserId, MovieId)> = row.lines.iter().map(|l| (row.user_id, l.movie_id)).collect();
            t.purchases.extend(bought);
        }
        Ok(())
    }

    async fn delete_order(&self, id: OrderId) -> Result<()> {
        let mut t = self.tables();
        match t.orders.get(&id) {
            Some(row) if row.status == OrderStatus::Pending => {
                t.orders.remove(&id);
                Ok(())
            }
            _ => Err(OrderError::NotDeletable.into()),
        }
    }

    async fn list_orders(&self, filter: &OrderFilter, page: Page) -> Result<(Vec<Order>, u64)> {
        let t = self.tables();
        let mut orders: Vec<Order> = t
            .orders
            .iter()
            .map(|(id, row)| t.load_order(*id, row))
            .filter(|o| filter.matches(o))
            .collect();
        orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(b.id().cmp(&a.id())));
        let total = orders.len() as u64;
        let page = orders.into_iter().skip(page.offset() as usize).take(page.limit() as usize).collect();
        Ok((page, total))
    }
}
