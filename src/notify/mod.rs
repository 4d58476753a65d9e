//! Moderator notifications
//!
//! Delivery is best effort: [`spawn_remove_movie`] detaches one task per
//! recipient and only logs failures, so a slow or broken sender can never
//! affect the request that triggered it.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use crate::domain::value_objects::CartId;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Tells `to` that `movie_name` was taken out of cart `cart_id`.
    async fn send_remove_movie(&self, to: &str, movie_name: &str, cart_id: CartId) -> Result<(), NotifyError>;
}

/// Writes notifications to the log instead of sending them.
#[derive(Clone, Debug)]
pub struct LogNotifier {
    sender: String,
}

impl LogNotifier {
    pub fn new(sender: impl Into<String>) -> Self { Self { sender: sender.into() } }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_remove_movie(&self, to: &str, movie_name: &str, cart_id: CartId) -> Result<(), NotifyError> {
        tracing::info!(
            from = %self.sender,
            to = %to,
            cart_id = %cart_id,
            subject = %format!("\"{movie_name}\" was removed from a cart"),
            "notification sent"
        );
        Ok(())
    }
}

/// Fans the removal notice out to `recipients` without waiting for delivery.
pub fn spawn_remove_movie(notifier: Arc<dyn Notifier>, recipients: Vec<String>, movie_name: String, cart_id: CartId) {
    for to in recipients {
        let notifier = Arc::clone(&notifier);
        let movie_name = movie_name.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.send_remove_movie(&to, &movie_name, cart_id).await {
                tracing::warn!(to = %to, cart_id = %cart_id, error = %e, "moderator notification failed");
            }
        });
    }
}
