//! Domain events
use crate::domain::value_objects::{CartId, Money, MovieId, OrderId, OrderStatus, UserId};

#[derive(Clone, Debug, PartialEq)]
pub enum DomainEvent {
    Cart(CartEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug, PartialEq)]
pub enum CartEvent {
    MovieRemoved { cart_id: CartId, movie_id: MovieId, movie_name: String },
    Cleared { cart_id: CartId, items: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub enum OrderEvent {
    Placed { order_id: OrderId, user_id: UserId, total: Money },
    StatusChanged { order_id: OrderId, from: OrderStatus, to: OrderStatus },
    Cancelled { order_id: OrderId },
    Deleted { order_id: OrderId },
}

impl DomainEvent {
    /// Writes the event to the log once it has been committed.
    pub fn log(&self) {
        match self {
            Self::Cart(CartEvent::MovieRemoved { cart_id, movie_id, .. }) => {
                tracing::info!(cart_id = %cart_id, movie_id = %movie_id, "movie removed from cart")
            }
            Self::Cart(CartEvent::Cleared { cart_id, items }) => {
                tracing::info!(cart_id = %cart_id, items, "cart cleared")
            }
            Self::Order(OrderEvent::Placed { order_id, user_id, total }) => {
                tracing::info!(order_id = %order_id, user_id = %user_id, total = %total, "order placed")
            }
            Self::Order(OrderEvent::StatusChanged { order_id, from, to }) => {
                tracing::info!(order_id = %order_id, from = %from, to = %to, "order status changed")
            }
            Self::Order(OrderEvent::Cancelled { order_id }) => tracing::info!(order_id = %order_id, "order cancelled"),
            Self::Order(OrderEvent::Deleted { order_id }) => tracing::info!(order_id = %order_id, "order deleted"),
        }
    }
}
