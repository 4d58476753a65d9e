//! Cart Aggregate

use serde::Serialize;
use thiserror::Error;
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::{CartId, Money, MovieId, UserId};

/// A user's cart. There is at most one per user; it is created on the first add.
#[derive(Clone, Debug, PartialEq)]
pub struct Cart {
    id: CartId,
    user_id: UserId,
    items: Vec<CartItem>,
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartItem {
    pub movie_id: MovieId,
}

/// A cart item joined with the movie it references.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct CartLine {
    pub id: MovieId,
    pub title: String,
    pub price: Money,
    pub genre: Vec<String>,
    pub release_year: i32,
}

impl Cart {
    pub fn new(id: CartId, user_id: UserId, movies: impl IntoIterator<Item = MovieId>) -> Self {
        Self { id, user_id, items: movies.into_iter().map(|movie_id| CartItem { movie_id }).collect(), events: vec![] }
    }

    pub fn id(&self) -> CartId { self.id }
    pub fn user_id(&self) -> UserId { self.user_id }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn contains(&self, movie_id: MovieId) -> bool { self.items.iter().any(|i| i.movie_id == movie_id) }
    pub fn movie_ids(&self) -> Vec<MovieId> { self.items.iter().map(|i| i.movie_id).collect() }

    pub fn add_movie(&mut self, movie_id: MovieId) -> Result<(), CartError> {
        if self.contains(movie_id) { return Err(CartError::AlreadyInCart); }
        self.items.push(CartItem { movie_id });
        Ok(())
    }

    pub fn remove_movie(&mut self, movie_id: MovieId, movie_name: &str) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| i.movie_id != movie_id);
        if self.items.len() == before { return Err(CartError::ItemNotFound); }
        self.raise_event(DomainEvent::Cart(CartEvent::MovieRemoved {
            cart_id: self.id,
            movie_id,
            movie_name: movie_name.to_string(),
        }));
        Ok(())
    }

    /// Empties the cart but keeps the cart itself.
    pub fn clear(&mut self) -> Result<usize, CartError> {
        if self.items.is_empty() { return Err(CartError::AlreadyEmpty); }
        let items = self.items.len();
        self.items.clear();
        self.raise_event(DomainEvent::Cart(CartEvent::Cleared { cart_id: self.id, items }));
        Ok(items)
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Movie is already in the cart.")]
    AlreadyInCart,
    #[error("You have already bought this movie")]
    AlreadyPurchased,
    #[error("Movie not found in cart")]
    ItemNotFound,
    #[error("Cart is already empty.")]
    AlreadyEmpty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_operations() {
        let mut cart = Cart::new(CartId(1), UserId(7), []);
        cart.add_movie(MovieId(10)).unwrap();
        cart.add_movie(MovieId(11)).unwrap();
        assert_eq!(cart.add_movie(MovieId(10)), Err(CartError::AlreadyInCart));
        assert_eq!(cart.movie_ids(), vec![MovieId(10), MovieId(11)]);
    }

    #[test]
    fn test_remove_raises_event() {
        let mut cart = Cart::new(CartId(1), UserId(7), [MovieId(10)]);
        assert_eq!(cart.remove_movie(MovieId(99), "Ghost"), Err(CartError::ItemNotFound));
        cart.remove_movie(MovieId(10), "Heat").unwrap();
        assert!(cart.is_empty());
        assert_eq!(
            cart.take_events(),
            vec![DomainEvent::Cart(CartEvent::MovieRemoved { cart_id: CartId(1), movie_id: MovieId(10), movie_name: "Heat".into() })]
        );
        assert!(cart.take_events().is_empty());
    }

    #[test]
    fn test_clear_empty_cart() {
        let mut cart = Cart::new(CartId(1), UserId(7), [MovieId(1), MovieId(2)]);
        assert_eq!(cart.clear(), Ok(2));
        assert_eq!(cart.clear(), Err(CartError::AlreadyEmpty));
    }
}
