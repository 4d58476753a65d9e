//! Business operations
//!
//! Services take the acting user's id explicitly, resolve it to an
//! [`Actor`](crate::domain::value_objects::Actor), enforce the rules and then
//! hand the writes to the [`Store`] as one transaction.

pub mod cart;
pub mod catalog;
pub mod order;

pub use cart::{AddedToCart, CartService, CartView, RemovedFromCart};
pub use catalog::{CatalogService, MoviePage};
pub use order::{OrderListQuery, OrderPage, OrderService};

use crate::domain::value_objects::{Actor, UserId};
use crate::store::Store;
use crate::{Result, StorefrontError};

pub(crate) async fn load_actor(store: &dyn Store, user_id: UserId) -> Result<Actor> {
    store
        .find_user(user_id)
        .await?
        .map(|u| u.actor())
        .ok_or_else(|| StorefrontError::not_found("User not found. Please sign up."))
}
