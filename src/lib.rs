//! Online Cinema Storefront
//!
//! Backend for an online cinema shop.
//!
//! ## Features
//! - Movie catalog browsing
//! - Per-user shopping cart
//! - Checkout into price-snapshotted orders
//! - Order lifecycle (pending, paid, cancelled)
//! - Moderator notifications on cart removals

pub mod config;
pub mod domain;
pub mod http;
pub mod notify;
pub mod services;
pub mod store;

use thiserror::Error;
use crate::domain::aggregates::{CartError, OrderError};
use crate::domain::value_objects::{InvalidStatus, PageError};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl StorefrontError {
    pub fn not_found(message: impl Into<String>) -> Self { Self::NotFound(message.into()) }
    pub fn bad_request(message: impl Into<String>) -> Self { Self::BadRequest(message.into()) }
    pub fn forbidden(message: impl Into<String>) -> Self { Self::Forbidden(message.into()) }
}

impl From<CartError> for StorefrontError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::ItemNotFound => Self::NotFound(e.to_string()),
            _ => Self::BadRequest(e.to_string()),
        }
    }
}

impl From<OrderError> for StorefrontError {
    fn from(e: OrderError) -> Self { Self::BadRequest(e.to_string()) }
}

impl From<InvalidStatus> for StorefrontError {
    fn from(e: InvalidStatus) -> Self { Self::BadRequest(e.to_string()) }
}

impl From<PageError> for StorefrontError {
    fn from(e: PageError) -> Self { Self::Validation(e.to_string()) }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
