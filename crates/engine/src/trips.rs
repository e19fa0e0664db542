//! Trips registry.
//!
//! The engine only needs a trip to exist and to know its name; itinerary data
//! lives elsewhere.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub name: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "trips")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
    #[sea_orm(has_many = "super::ledger::Entity")]
    LedgerRows,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::ledger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerRows.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Trip> for ActiveModel {
    fn from(trip: &Trip) -> Self {
        Self {
            id: ActiveValue::Set(trip.id.clone()),
            name: ActiveValue::Set(trip.name.clone()),
            created_by: ActiveValue::Set(trip.created_by.clone()),
            created_at: ActiveValue::Set(trip.created_at),
        }
    }
}

impl From<Model> for Trip {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}
