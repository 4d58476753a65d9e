//! User record as seen by the storefront

use crate::domain::value_objects::{Actor, UserGroup, UserId};

#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub group: UserGroup,
}

impl User {
    pub fn actor(&self) -> Actor { Actor::new(self.id, self.group) }
}
