//! Order Aggregate

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;
use crate::domain::aggregates::movie::Movie;
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::{Money, MovieId, OrderId, OrderStatus, UserId};

#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    status: OrderStatus,
    total_amount: Money,
    created_at: DateTime<Utc>,
    items: Vec<OrderItem>,
    events: Vec<DomainEvent>,
}

/// One purchased movie. `price_at_order` is the catalog price when the order was placed.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderItem {
    pub movie_id: MovieId,
    pub movie_name: String,
    pub price_at_order: Money,
}

/// An order priced from the catalog but not yet persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderDraft {
    pub user_id: UserId,
    pub total_amount: Money,
    pub lines: Vec<OrderLine>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderLine {
    pub movie_id: MovieId,
    pub price_at_order: Money,
}

impl OrderDraft {
    /// Prices every distinct movie at its current catalog price.
    pub fn price(user_id: UserId, movies: &[Movie]) -> Result<Self, OrderError> {
        let mut seen = HashSet::new();
        let lines: Vec<OrderLine> = movies
            .iter()
            .filter(|m| seen.insert(m.id))
            .map(|m| OrderLine { movie_id: m.id, price_at_order: m.price })
            .collect();
        if lines.is_empty() { return Err(OrderError::EmptyCart); }
        let total_amount = lines.iter().map(|l| l.price_at_order).sum();
        Ok(Self { user_id, total_amount, lines })
    }
}

impl Order {
    pub fn new(
        id: OrderId,
        user_id: UserId,
        status: OrderStatus,
        total_amount: Money,
        created_at: DateTime<Utc>,
        items: Vec<OrderItem>,
    ) -> Self {
        Self { id, user_id, status, total_amount, created_at, items, events: vec![] }
    }

    pub fn id(&self) -> OrderId { self.id }
    pub fn user_id(&self) -> UserId { self.user_id }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn total_amount(&self) -> Money { self.total_amount }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn items(&self) -> &[OrderItem] { &self.items }
    pub fn movie_names(&self) -> Vec<String> { self.items.iter().map(|i| i.movie_name.clone()).collect() }

    pub fn placed_event(&self) -> DomainEvent {
        DomainEvent::Order(OrderEvent::Placed { order_id: self.id, user_id: self.user_id, total: self.total_amount })
    }

    pub fn ensure_viewable(&self) -> Result<(), OrderError> {
        if self.status == OrderStatus::Cancelled { return Err(OrderError::Inaccessible); }
        Ok(())
    }

    pub fn change_status(&mut self, to: OrderStatus) -> Result<(), OrderError> {
        if self.status.is_terminal() { return Err(OrderError::CannotUpdate); }
        let from = self.status;
        self.status = to;
        if from != to {
            self.raise_event(DomainEvent::Order(OrderEvent::StatusChanged { order_id: self.id, from, to }));
        }
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Pending { return Err(OrderError::NotCancellable); }
        self.status = OrderStatus::Cancelled;
        self.raise_event(DomainEvent::Order(OrderEvent::Cancelled { order_id: self.id }));
        Ok(())
    }

    /// Only pending orders may be deleted.
    pub fn delete(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Pending { return Err(OrderError::NotDeletable); }
        self.raise_event(DomainEvent::Order(OrderEvent::Deleted { order_id: self.id }));
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("You have unpaid order")]
    UnpaidOrder,
    #[error("Your cart is empty")]
    EmptyCart,
    #[error("Cannot update a paid or cancelled order")]
    CannotUpdate,
    #[error("Only pending orders can be cancelled")]
    NotCancellable,
    #[error("Cannot delete a paid or cancelled order")]
    NotDeletable,
    #[error("Order is cancelled and cannot be accessed")]
    Inaccessible,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn movie(id: i64, cents: i64) -> Movie {
        Movie {
            id: MovieId(id), name: format!("Movie {id}"), year: 2000, time: 120, imdb: 7.5, votes: 100,
            description: String::new(), price: Money::new(Decimal::new(cents, 2)),
        }
    }

    fn pending_order() -> Order {
        Order::new(OrderId(1), UserId(1), OrderStatus::Pending, Money::new(Decimal::new(1000, 2)), Utc::now(), vec![])
    }

    #[test]
    fn test_draft_prices_distinct_movies() {
        let draft = OrderDraft::price(UserId(1), &[movie(1, 1000), movie(2, 499), movie(1, 1000)]).unwrap();
        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.total_amount.amount(), Decimal::new(1499, 2));
    }

    #[test]
    fn test_draft_requires_movies() {
        assert_eq!(OrderDraft::price(UserId(1), &[]), Err(OrderError::EmptyCart));
    }

    #[test]
    fn test_order_workflow() {
        let mut order = pending_order();
        order.change_status(OrderStatus::Paid).unwrap();
        assert_eq!(order.status(), OrderStatus::Paid);
        assert_eq!(order.change_status(OrderStatus::Pending), Err(OrderError::CannotUpdate));
        assert_eq!(order.cancel(), Err(OrderError::NotCancellable));
        assert_eq!(order.delete(), Err(OrderError::NotDeletable));
        assert_eq!(order.take_events().len(), 1);
    }

    #[test]
    fn test_cancel_twice() {
        let mut order = pending_order();
        order.cancel().unwrap();
        assert_eq!(order.cancel(), Err(OrderError::NotCancellable));
        assert_eq!(order.ensure_viewable(), Err(OrderError::Inaccessible));
    }

    #[test]
    fn test_pending_to_pending_is_silent() {
        let mut order = pending_order();
        order.change_status(OrderStatus::Pending).unwrap();
        assert!(order.take_events().is_empty());
    }
}
