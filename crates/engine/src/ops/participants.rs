use sea_orm::DatabaseTransaction;

use crate::{LedgerRow, ResultEngine, store};

use super::{Engine, with_tx};

impl Engine {
    /// Registers a user (by id or handle) for expense splitting on a trip.
    ///
    /// Joining twice is a no-op: the existing ledger row is returned untouched.
    pub async fn add_participant(&self, trip_id: &str, user: &str) -> ResultEngine<LedgerRow> {
        with_tx!(self, |db_tx| join_trip(&db_tx, trip_id, user).await)
    }

    /// Ledger rows of everyone registered on the trip, ordered by user id.
    pub async fn list_participants(&self, trip_id: &str) -> ResultEngine<Vec<LedgerRow>> {
        store::require_trip(&self.database, trip_id).await?;
        store::ledger_rows_by_trip(&self.database, trip_id).await
    }
}

async fn join_trip(
    db_tx: &DatabaseTransaction,
    trip_id: &str,
    user: &str,
) -> ResultEngine<LedgerRow> {
    store::require_trip(db_tx, trip_id).await?;
    let user = store::resolve_user(db_tx, user).await?;
    let (row, created) = store::find_or_create_ledger_row(db_tx, trip_id, &user.id).await?;
    if created {
        tracing::info!(trip_id, user_id = %user.id, "participant joined expense splitting");
    } else {
        tracing::debug!(trip_id, user_id = %user.id, "participant already registered");
    }
    Ok(row)
}
