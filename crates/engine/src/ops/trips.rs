use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseTransaction};
use uuid::Uuid;

use crate::{
    LedgerRow, ResultEngine, Trip, ledger, store, trips,
    util::normalize_required_name,
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a trip. The creator is registered as its first participant.
    pub async fn new_trip(&self, name: &str, user_id: &str) -> ResultEngine<Trip> {
        let name = normalize_required_name(name, "trip name")?;
        with_tx!(self, |db_tx| insert_trip(&db_tx, name, user_id).await)
    }

    /// Returns the trip or `KeyNotFound`.
    pub async fn trip(&self, trip_id: &str) -> ResultEngine<Trip> {
        Ok(store::require_trip(&self.database, trip_id).await?.into())
    }
}

async fn insert_trip(
    db_tx: &DatabaseTransaction,
    name: String,
    user_id: &str,
) -> ResultEngine<Trip> {
    let creator = store::resolve_user(db_tx, user_id).await?;
    let trip = Trip {
        id: Uuid::new_v4().to_string(),
        name,
        created_by: creator.id.clone(),
        created_at: Utc::now(),
    };
    trips::ActiveModel::from(&trip).insert(db_tx).await?;
    ledger::ActiveModel::from(&LedgerRow::new(trip.id.as_str(), creator.id.as_str()))
        .insert(db_tx)
        .await?;

    tracing::info!(trip_id = %trip.id, created_by = %trip.created_by, "trip created");
    Ok(trip)
}
