//! PostgreSQL store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use crate::domain::aggregates::{Cart, CartError, CartLine, Movie, MovieFilter, MovieSort, Order, OrderDraft, OrderError, OrderItem, User};
use crate::domain::value_objects::{CartId, Money, MovieId, OrderId, OrderStatus, Page, UserId};
use crate::store::{OrderFilter, Store};
use crate::{Result, StorefrontError};

const ORDER_COLUMNS: &str = "id, user_id, status, total_amount, created_at";
const MOVIE_COLUMNS: &str = "m.id, m.name, m.year, m.time, m.imdb, m.votes, m.description, m.price";

#[derive(Debug, sqlx::FromRow)]
struct OrderRecord {
    id: OrderId,
    user_id: UserId,
    status: OrderStatus,
    total_amount: Money,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRecord {
    order_id: OrderId,
    movie_id: MovieId,
    movie_name: String,
    price_at_order: Money,
}

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
    pub fn pool(&self) -> &PgPool { &self.pool }

    /// Attaches items (with movie names) to a batch of order rows, keeping row order.
    async fn hydrate(&self, records: Vec<OrderRecord>) -> Result<Vec<Order>> {
        let ids: Vec<i64> = records.iter().map(|r| r.id.value()).collect();
        let items = sqlx::query_as::<_, OrderItemRecord>(
            "SELECT oi.order_id, oi.movie_id, m.name AS movie_name, oi.price_at_order \
             FROM order_items oi JOIN movies m ON m.id = oi.movie_id \
             WHERE oi.order_id = ANY($1) ORDER BY oi.id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for i in items {
            by_order.entry(i.order_id).or_default().push(OrderItem {
                movie_id: i.movie_id,
                movie_name: i.movie_name,
                price_at_order: i.price_at_order,
            });
        }
        Ok(records
            .into_iter()
            .map(|r| {
                let items = by_order.remove(&r.id).unwrap_or_default();
                Order::new(r.id, r.user_id, r.status, r.total_amount, r.created_at, items)
            })
            .collect())
    }

    async fn cart_items(&self, id: CartId) -> Result<Vec<MovieId>> {
        Ok(sqlx::query_scalar::<_, MovieId>("SELECT movie_id FROM cart_items WHERE cart_id = $1 ORDER BY id")
            .bind(id)
            .fetch_all(&self.pool)
            .await?)
    }
}

/// Maps a violation of `constraint` to a business error; anything else is a storage failure.
fn on_violation(e: sqlx::Error, constraint: &str, mapped: impl Into<StorefrontError>) -> StorefrontError {
    match &e {
        sqlx::Error::Database(db) if db.constraint() == Some(constraint) => mapped.into(),
        _ => e.into(),
    }
}

fn like_pattern(needle: &str) -> String {
    let escaped = needle.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_related_match(qb: &mut QueryBuilder<'_, Postgres>, link: &str, table: &str, key: &str, pattern: String) {
    qb.push(format!(
        "EXISTS (SELECT 1 FROM {link} l JOIN {table} r ON r.id = l.{key} WHERE l.movie_id = m.id AND r.name ILIKE "
    ));
    qb.push_bind(pattern).push(")");
}

fn push_movie_conditions(qb: &mut QueryBuilder<'_, Postgres>, f: &MovieFilter) {
    qb.push(" WHERE TRUE");
    if let Some(year) = f.year { qb.push(" AND m.year = ").push_bind(year); }
    if let Some(min) = f.min_imdb { qb.push(" AND m.imdb >= ").push_bind(min); }
    if let Some(max) = f.max_imdb { qb.push(" AND m.imdb <= ").push_bind(max); }
    if let Some(genre) = &f.genre {
        qb.push(" AND ");
        push_related_match(qb, "movie_genres", "genres", "genre_id", like_pattern(genre));
    }
    if let Some(director) = &f.director {
        qb.push(" AND ");
        push_related_match(qb, "movie_directors", "directors", "director_id", like_pattern(director));
    }
    if let Some(star) = &f.star {
        qb.push(" AND ");
        push_related_match(qb, "movie_stars", "stars", "star_id", like_pattern(star));
    }
    if let Some(search) = &f.search {
        let pattern = like_pattern(search);
        qb.push(" AND (m.name ILIKE ").push_bind(pattern.clone());
        qb.push(" OR m.description ILIKE ").push_bind(pattern.clone());
        qb.push(" OR ");
        push_related_match(qb, "movie_directors", "directors", "director_id", pattern.clone());
        qb.push(" OR ");
        push_related_match(qb, "movie_stars", "stars", "star_id", pattern);
        qb.push(")");
    }
}

fn push_order_conditions(qb: &mut QueryBuilder<'_, Postgres>, f: &OrderFilter) {
    qb.push(" WHERE TRUE");
    if let Some(user_id) = f.user_id { qb.push(" AND user_id = ").push_bind(user_id); }
    if let Some(status) = f.status { qb.push(" AND status = ").push_bind(status); }
    if let Some((start, end)) = f.created {
        qb.push(" AND created_at >= ").push_bind(start);
        qb.push(" AND created_at < ").push_bind(end);
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(sqlx::query_as::<_, User>(r#"SELECT id, email, "group" FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn moderators(&self) -> Result<Vec<User>> {
        Ok(sqlx::query_as::<_, User>(r#"SELECT id, email, "group" FROM users WHERE "group" = 'moderator' ORDER BY id"#)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_movie(&self, id: MovieId) -> Result<Option<Movie>> {
        Ok(sqlx::query_as::<_, Movie>(&format!("SELECT {MOVIE_COLUMNS} FROM movies m WHERE m.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_movies(&self, filter: &MovieFilter, page: Page) -> Result<(Vec<Movie>, u64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM movies m");
        push_movie_conditions(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {MOVIE_COLUMNS} FROM movies m"));
        push_movie_conditions(&mut qb, filter);
        qb.push(match filter.sort {
            Some(MovieSort::Price) => " ORDER BY m.price DESC, m.id",
            Some(MovieSort::Year) => " ORDER BY m.year DESC, m.id",
            Some(MovieSort::Votes) => " ORDER BY m.votes DESC, m.id",
            None => " ORDER BY m.id",
        });
        qb.push(" LIMIT ").push_bind(page.limit() as i64);
        qb.push(" OFFSET ").push_bind(page.offset() as i64);
        let movies = qb.build_query_as::<Movie>().fetch_all(&self.pool).await?;
        Ok((movies, total.max(0) as u64))
    }

    async fn has_purchased(&self, user_id: UserId, movie_id: MovieId) -> Result<bool> {
        Ok(sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM purchases WHERE user_id = $1 AND movie_id = $2)")
            .bind(user_id)
            .bind(movie_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_cart(&self, id: CartId) -> Result<Option<Cart>> {
        let owner: Option<UserId> = sqlx::query_scalar("SELECT user_id FROM carts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(user_id) = owner else { return Ok(None) };
        Ok(Some(Cart::new(id, user_id, self.cart_items(id).await?)))
    }

    async fn cart_lines(&self, id: CartId) -> Result<Vec<CartLine>> {
        Ok(sqlx::query_as::<_, CartLine>(
            "SELECT m.id, m.name AS title, m.price, m.year AS release_year, \
                    COALESCE(ARRAY_AGG(g.name ORDER BY g.name) FILTER (WHERE g.name IS NOT NULL), '{}') AS genre \
             FROM cart_items ci \
             JOIN movies m ON m.id = ci.movie_id \
             LEFT JOIN movie_genres mg ON mg.movie_id = m.id \
             LEFT JOIN genres g ON g.id = mg.genre_id \
             WHERE ci.cart_id = $1 \
             GROUP BY ci.id, m.id \
             ORDER BY ci.id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn add_cart_item(&self, user_id: UserId, movie_id: MovieId) -> Result<CartId> {
        let mut tx = self.pool.begin().await?;
        let cart_id: CartId = sqlx::query_scalar(
            "INSERT INTO carts (user_id) VALUES ($1) \
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id RETURNING id",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        sqlx::query("INSERT INTO cart_items (cart_id, movie_id) VALUES ($1, $2)")
            .bind(cart_id)
            .bind(movie_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| on_violation(e, "cart_items_cart_movie_key", CartError::AlreadyInCart))?;
        tx.commit().await?;
        Ok(cart_id)
    }

    async fn remove_cart_item(&self, cart_id: CartId, movie_id: MovieId) -> Result<bool> {
        let done = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND movie_id = $2")
            .bind(cart_id)
            .bind(movie_id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn clear_cart(&self, cart_id: CartId) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let done = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1").bind(cart_id).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(done.rows_affected())
    }

    async fn has_pending_order(&self, user_id: UserId) -> Result<bool> {
        Ok(sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM orders WHERE user_id = $1 AND status = 'pending')")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn place_order(&self, user_id: UserId) -> Result<Order> {
        let mut tx = self.pool.begin().await?;
        // Locking the cart row makes concurrent add-to-cart wait for the checkout.
        let cart_id: Option<CartId> = sqlx::query_scalar("SELECT id FROM carts WHERE user_id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        let cart_id = cart_id.ok_or(OrderError::EmptyCart)?;
        let movies = sqlx::query_as::<_, Movie>(&format!(
            "SELECT {MOVIE_COLUMNS} FROM cart_items ci JOIN movies m ON m.id = ci.movie_id \
             WHERE ci.cart_id = $1 ORDER BY ci.id"
        ))
        .bind(cart_id)
        .fetch_all(&mut *tx)
        .await?;
        let draft = OrderDraft::price(user_id, &movies)?;

        let order_id: OrderId = sqlx::query_scalar(
            "INSERT INTO orders (user_id, status, total_amount) VALUES ($1, 'pending', $2) RETURNING id",
        )
        .bind(draft.user_id)
        .bind(draft.total_amount)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| on_violation(e, "orders_one_pending_per_user", OrderError::UnpaidOrder))?;

        let movie_ids: Vec<i64> = draft.lines.iter().map(|l| l.movie_id.value()).collect();
        let prices: Vec<rust_decimal::Decimal> = draft.lines.iter().map(|l| l.price_at_order.amount()).collect();
        sqlx::query(
            "INSERT INTO order_items (order_id, movie_id, price_at_order) \
             SELECT $1, movie_id, price FROM UNNEST($2::BIGINT[], $3::NUMERIC[]) AS t (movie_id, price)",
        )
        .bind(order_id)
        .bind(&movie_ids)
        .bind(&prices)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1").bind(cart_id).execute(&mut *tx).await?;
        sqlx::query("DELETE FROM carts WHERE id = $1").bind(cart_id).execute(&mut *tx).await?;
        tx.commit().await?;

        self.find_order(order_id)
            .await?
            .ok_or_else(|| StorefrontError::not_found("Order not found"))
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>> {
        let record = sqlx::query_as::<_, OrderRecord>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(record) = record else { return Ok(None) };
        Ok(self.hydrate(vec![record]).await?.pop())
    }

    async fn save_order_status(&self, order: &Order) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let done = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1 AND status = 'pending'")
            .bind(order.id())
            .bind(order.status())
            .execute(&mut *tx)
            .await?;
        if done.rows_affected() == 0 { return Err(OrderError::CannotUpdate.into()); }
        if order.status() == OrderStatus::Paid {
            sqlx::query(
                "INSERT INTO purchases (user_id, movie_id) \
                 SELECT o.user_id, oi.movie_id FROM orders o JOIN order_items oi ON oi.order_id = o.id \
                 WHERE o.id = $1 ON CONFLICT DO NOTHING",
            )
            .bind(order.id())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_order(&self, id: OrderId) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM order_items WHERE order_id = $1").bind(id).execute(&mut *tx).await?;
        let done = sqlx::query("DELETE FROM orders WHERE id = $1 AND status = 'pending'")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if done.rows_affected() == 0 { return Err(OrderError::NotDeletable.into()); }
        tx.commit().await?;
        Ok(())
    }

    async fn list_orders(&self, filter: &OrderFilter, page: Page) -> Result<(Vec<Order>, u64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM orders");
        push_order_conditions(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {ORDER_COLUMNS} FROM orders"));
        push_order_conditions(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC");
        qb.push(" LIMIT ").push_bind(page.limit() as i64);
        qb.push(" OFFSET ").push_bind(page.offset() as i64);
        let records = qb.build_query_as::<OrderRecord>().fetch_all(&self.pool).await?;
        Ok((self.hydrate(records).await?, total.max(0) as u64))
    }
}
