//! Expense primitives.
//!
//! An [`Expense`] is a single shared cost event: one payer fronts `amount` for
//! the group and the [`Share`]s say who owes what. Expenses are created once
//! and never edited.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, Share, util::parse_uuid};

use super::shares;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub trip_id: String,
    pub name: String,
    pub category: Option<String>,
    pub amount: MoneyCents,
    pub date: DateTime<Utc>,
    pub payer_id: String,
    pub created_by: String,
    pub shares: Vec<Share>,
}

impl Expense {
    pub fn new(
        trip_id: String,
        name: String,
        category: Option<String>,
        amount: MoneyCents,
        date: DateTime<Utc>,
        payer_id: String,
        created_by: String,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "expense amount must be > 0".to_string(),
            ));
        }
        if name.trim().is_empty() {
            return Err(EngineError::InvalidExpense(
                "expense name must not be empty".to_string(),
            ));
        }
        if payer_id.trim().is_empty() {
            return Err(EngineError::InvalidExpense(
                "payer must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            trip_id,
            name,
            category,
            amount,
            date,
            payer_id,
            created_by,
            shares: Vec::new(),
        })
    }

    /// Sum of all share amounts.
    pub fn shares_total(&self) -> MoneyCents {
        self.shares.iter().map(|s| s.amount).sum()
    }

    /// Returns `true` when the payer also owes a share.
    pub fn payer_has_share(&self) -> bool {
        self.shares.iter().any(|s| s.user_id == self.payer_id)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub trip_id: String,
    pub name: String,
    pub category: Option<String>,
    pub amount_minor: i64,
    pub date: DateTimeUtc,
    pub payer_id: String,
    pub created_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::shares::Entity")]
    Shares,
    #[sea_orm(
        belongs_to = "super::trips::Entity",
        from = "Column::TripId",
        to = "super::trips::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Trips,
}

impl Related<super::shares::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shares.def()
    }
}

impl Related<super::trips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trips.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            trip_id: ActiveValue::Set(expense.trip_id.clone()),
            name: ActiveValue::Set(expense.name.clone()),
            category: ActiveValue::Set(expense.category.clone()),
            amount_minor: ActiveValue::Set(expense.amount.cents()),
            date: ActiveValue::Set(expense.date),
            payer_id: ActiveValue::Set(expense.payer_id.clone()),
            created_by: ActiveValue::Set(expense.created_by.clone()),
        }
    }
}

impl TryFrom<(Model, Vec<shares::Model>)> for Expense {
    type Error = EngineError;

    fn try_from(
        (model, mut share_models): (Model, Vec<shares::Model>),
    ) -> Result<Self, Self::Error> {
        share_models.sort_by_key(|s| s.position);
        let shares = share_models
            .into_iter()
            .map(Share::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            trip_id: model.trip_id,
            name: model.name,
            category: model.category,
            amount: MoneyCents::new(model.amount_minor),
            date: model.date,
            payer_id: model.payer_id,
            created_by: model.created_by,
            shares,
        })
    }
}
