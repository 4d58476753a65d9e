//! Aggregates module
pub mod movie;
pub mod cart;
pub mod order;
pub mod user;

pub use movie::{Movie, MovieFilter, MovieSort};
pub use cart::{Cart, CartError, CartItem, CartLine};
pub use order::{Order, OrderDraft, OrderError, OrderItem, OrderLine};
pub use user::User;
