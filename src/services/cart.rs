//! Cart operations

use serde::Serialize;
use std::sync::Arc;
use crate::domain::aggregates::{Cart, CartError, CartLine};
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::{Actor, CartId, MovieId, UserId};
use crate::notify::{spawn_remove_movie, Notifier};
use crate::services::load_actor;
use crate::store::Store;
use crate::{Result, StorefrontError};

/// Cart id and its items, as returned to the owner.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartView {
    pub id: CartId,
    pub items: Vec<CartLine>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AddedToCart {
    pub cart_id: CartId,
    pub movie_name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RemovedFromCart {
    pub cart_id: CartId,
    pub movie_name: String,
}

#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
}

impl CartService {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>) -> Self { Self { store, notifier } }

    pub async fn add_movie(&self, user_id: UserId, movie_id: MovieId) -> Result<AddedToCart> {
        let actor = load_actor(self.store.as_ref(), user_id).await?;
        let movie = self
            .store
            .find_movie(movie_id)
            .await?
            .ok_or_else(|| StorefrontError::bad_request("Movie not found"))?;
        if self.store.has_purchased(actor.user_id, movie_id).await? {
            return Err(CartError::AlreadyPurchased.into());
        }

        let cart_id = self.store.add_cart_item(actor.user_id, movie_id).await?;
        tracing::info!(user_id = %actor.user_id, cart_id = %cart_id, movie_id = %movie_id, "movie added to cart");
        Ok(AddedToCart { cart_id, movie_name: movie.name })
    }

    /// Owners see their own cart; admins may see anyone's.
    pub async fn get_cart(&self, requester: UserId, cart_id: CartId) -> Result<CartView> {
        let actor = load_actor(self.store.as_ref(), requester).await?;
        let cart = self
            .store
            .find_cart(cart_id)
            .await?
            .ok_or_else(|| StorefrontError::not_found("Cart not found."))?;
        if !actor.can_access(cart.user_id()) {
            return Err(StorefrontError::forbidden("Not authorized to view this cart."));
        }
        let items = self.store.cart_lines(cart.id()).await?;
        Ok(CartView { id: cart.id(), items })
    }

    pub async fn clear_cart(&self, requester: UserId, cart_id: CartId) -> Result<()> {
        let actor = load_actor(self.store.as_ref(), requester).await?;
        let mut cart = self.owned_cart(&actor, cart_id).await?;
        cart.clear()?;
        self.store.clear_cart(cart.id()).await?;
        for event in cart.take_events() { event.log(); }
        Ok(())
    }

    /// Removes one movie, then notifies every moderator out of band.
    pub async fn remove_movie(&self, requester: UserId, cart_id: CartId, movie_id: MovieId) -> Result<RemovedFromCart> {
        let actor = load_actor(self.store.as_ref(), requester).await?;
        let movie = self
            .store
            .find_movie(movie_id)
            .await?
            .ok_or_else(|| StorefrontError::not_found("Movie not found"))?;
        let mut cart = self.owned_cart(&actor, cart_id).await?;
        cart.remove_movie(movie_id, &movie.name)?;
        if !self.store.remove_cart_item(cart.id(), movie_id).await? {
            return Err(CartError::ItemNotFound.into());
        }

        for event in cart.take_events() {
            event.log();
            if let DomainEvent::Cart(CartEvent::MovieRemoved { cart_id, movie_name, .. }) = event {
                self.notify_moderators(cart_id, movie_name).await;
            }
        }
        Ok(RemovedFromCart { cart_id: cart.id(), movie_name: movie.name })
    }

    async fn owned_cart(&self, actor: &Actor, cart_id: CartId) -> Result<Cart> {
        match self.store.find_cart(cart_id).await? {
            Some(cart) if cart.user_id() == actor.user_id => Ok(cart),
            _ => Err(StorefrontError::not_found("Cart not found")),
        }
    }

    async fn notify_moderators(&self, cart_id: CartId, movie_name: String) {
        match self.store.moderators().await {
            Ok(moderators) => {
                let recipients = moderators.into_iter().map(|m| m.email).collect();
                spawn_remove_movie(Arc::clone(&self.notifier), recipients, movie_name, cart_id);
            }
            Err(e) => tracing::warn!(cart_id = %cart_id, error = %e, "could not look up moderators to notify"),
        }
    }
}
