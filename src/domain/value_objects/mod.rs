//! Value Objects for the cinema storefront

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn value(self) -> i64 { self.0 }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self { Self(value) }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
        }
    };
}

id_type!(
    /// Primary key of a `users` row
    UserId
);
id_type!(MovieId);
id_type!(CartId);
id_type!(OrderId);

/// Money value object
///
/// Prices are stored as `NUMERIC(10,2)`; the storefront only trades in one currency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self { Self(amount) }
    pub fn amount(&self) -> Decimal { self.0 }
    pub fn add(&self, other: &Money) -> Money { Money(self.0 + other.0) }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc.add(&m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Lifecycle state of an order
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    /// `paid` and `cancelled` accept no further edits.
    pub fn is_terminal(&self) -> bool { !matches!(self, Self::Pending) }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid status")]
pub struct InvalidStatus;

impl FromStr for OrderStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(InvalidStatus),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Group a user belongs to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_group", rename_all = "lowercase")]
pub enum UserGroup {
    #[default]
    User,
    Moderator,
    Admin,
}

/// The authenticated user on whose behalf an operation runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub group: UserGroup,
}

impl Actor {
    pub fn new(user_id: UserId, group: UserGroup) -> Self { Self { user_id, group } }
    pub fn is_admin(&self) -> bool { self.group == UserGroup::Admin }

    /// Owners always pass; anyone else must be an admin.
    pub fn can_access(&self, owner: UserId) -> bool { self.user_id == owner || self.is_admin() }
}

pub const MAX_PER_PAGE: u32 = 20;
pub const DEFAULT_PER_PAGE: u32 = 10;

/// 1-based page request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    number: u32,
    per_page: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("page must be greater than or equal to 1")]
    Number,
    #[error("per_page must be between 1 and {MAX_PER_PAGE}")]
    Size,
}

impl Page {
    pub fn new(number: u32, per_page: u32) -> Result<Self, PageError> {
        if number == 0 { return Err(PageError::Number); }
        if per_page == 0 || per_page > MAX_PER_PAGE { return Err(PageError::Size); }
        Ok(Self { number, per_page })
    }

    pub fn number(&self) -> u32 { self.number }
    pub fn per_page(&self) -> u32 { self.per_page }
    pub fn offset(&self) -> u64 { u64::from(self.number - 1) * u64::from(self.per_page) }
    pub fn limit(&self) -> u64 { u64::from(self.per_page) }

    pub fn total_pages(&self, total_items: u64) -> u64 { total_items.div_ceil(u64::from(self.per_page)) }

    /// Link to the previous page, if there is one.
    pub fn prev_link(&self, base: &str) -> Option<String> {
        (self.number > 1).then(|| format!("{base}?page={}&per_page={}", self.number - 1, self.per_page))
    }

    /// Link to the next page, if it is within `total_items`.
    pub fn next_link(&self, base: &str, total_items: u64) -> Option<String> {
        (u64::from(self.number) < self.total_pages(total_items))
            .then(|| format!("{base}?page={}&per_page={}", self.number + 1, self.per_page))
    }
}

impl Default for Page {
    fn default() -> Self { Self { number: 1, per_page: DEFAULT_PER_PAGE } }
}
