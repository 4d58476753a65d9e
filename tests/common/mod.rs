#![allow(dead_code)]

use async_trait::async_trait;
use cinema_storefront::domain::value_objects::{CartId, Money, MovieId, UserGroup, UserId};
use cinema_storefront::notify::{Notifier, NotifyError};
use cinema_storefront::services::{CartService, OrderService};
use cinema_storefront::store::memory::MovieSeed;
use cinema_storefront::store::{InMemoryStore, Store};
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Records every notification it is asked to send.
pub struct RecordingNotifier {
    tx: mpsc::UnboundedSender<(String, String, CartId)>,
}

impl RecordingNotifier {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<(String, String, CartId)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_remove_movie(&self, to: &str, movie_name: &str, cart_id: CartId) -> Result<(), NotifyError> {
        let _ = self.tx.send((to.to_string(), movie_name.to_string(), cart_id));
        Ok(())
    }
}

/// Fails every delivery.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send_remove_movie(&self, _to: &str, _movie_name: &str, _cart_id: CartId) -> Result<(), NotifyError> {
        Err(NotifyError::Delivery("smtp unreachable".into()))
    }
}

pub struct Fixture {
    pub store: InMemoryStore,
    pub carts: CartService,
    pub orders: OrderService,
    pub alice: UserId,
    pub bob: UserId,
    pub admin: UserId,
    pub moderator: UserId,
    pub matrix: MovieId,
    pub alien: MovieId,
}

impl Fixture {
    pub fn new() -> Self { Self::with_notifier(Arc::new(FailingNotifier)) }

    pub fn with_notifier(notifier: Arc<dyn Notifier>) -> Self {
        let store = InMemoryStore::new();
        let alice = store.add_user("alice@example.com", UserGroup::User);
        let bob = store.add_user("bob@example.com", UserGroup::User);
        let admin = store.add_user("admin@example.com", UserGroup::Admin);
        let moderator = store.add_user("mod@example.com", UserGroup::Moderator);
        let matrix = store.add_movie(
            MovieSeed::new("The Matrix", money(dec!(10.00)))
                .year(1999)
                .imdb(8.7)
                .votes(2000)
                .genres(&["Action", "Sci-Fi"])
                .directors(&["Lana Wachowski"])
                .stars(&["Keanu Reeves"]),
        );
        let alien = store.add_movie(
            MovieSeed::new("Alien", money(dec!(7.50)))
                .year(1979)
                .imdb(8.5)
                .votes(900)
                .genres(&["Horror", "Sci-Fi"])
                .directors(&["Ridley Scott"])
                .stars(&["Sigourney Weaver"]),
        );

        let shared: Arc<dyn Store> = Arc::new(store.clone());
        Self {
            carts: CartService::new(Arc::clone(&shared), notifier),
            orders: OrderService::new(shared),
            store,
            alice,
            bob,
            admin,
            moderator,
            matrix,
            alien,
        }
    }

    /// Puts `movies` in `user`'s cart and checks out.
    pub async fn place(&self, user: UserId, movies: &[MovieId]) -> cinema_storefront::domain::aggregates::Order {
        for m in movies {
            self.carts.add_movie(user, *m).await.unwrap();
        }
        self.orders.create_order(user).await.unwrap()
    }
}

pub fn money(amount: rust_decimal::Decimal) -> Money { Money::new(amount) }
