//! Users table and identity lookups.
//!
//! A user has a stable `id` (stored on every share and ledger row) and a
//! human-readable `username` handle. Handles are stored in canonical form,
//! see [`normalize_handle`](crate::util::normalize_handle).

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
}

impl User {
    /// The name to show in balances: the display name, else the handle.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub username: String,
    pub display_name: Option<String>,
    pub password: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn new_user(
        id: String,
        username: String,
        display_name: Option<String>,
        password_digest: String,
    ) -> Self {
        Self {
            id: ActiveValue::Set(id),
            username: ActiveValue::Set(username),
            display_name: ActiveValue::Set(display_name),
            password: ActiveValue::Set(password_digest),
        }
    }
}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            display_name: model.display_name,
        }
    }
}
