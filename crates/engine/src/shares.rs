//! Expense shares.
//!
//! A [`Share`] is one participant's portion of one
//! [`Expense`](crate::Expense). An expense has exactly one share per
//! participating user, so the table is keyed by `(expense_id, user_id)`.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub expense_id: Uuid,
    pub user_id: String,
    pub amount: MoneyCents,
}

impl Share {
    pub fn new(expense_id: Uuid, user_id: impl Into<String>, amount: MoneyCents) -> Self {
        Self {
            expense_id,
            user_id: user_id.into(),
            amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_shares")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub expense_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub amount_minor: i64,
    /// Position of the share inside its expense.
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn from_share(share: &Share, position: i32) -> Self {
        Self {
            expense_id: ActiveValue::Set(share.expense_id.to_string()),
            user_id: ActiveValue::Set(share.user_id.clone()),
            amount_minor: ActiveValue::Set(share.amount.cents()),
            position: ActiveValue::Set(position),
        }
    }
}

impl TryFrom<Model> for Share {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            expense_id: parse_uuid(&model.expense_id, "expense")?,
            user_id: model.user_id,
            amount: MoneyCents::new(model.amount_minor),
        })
    }
}
