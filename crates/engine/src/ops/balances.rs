use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};

use crate::{
    Balance, EngineError, Expense, MoneyCents, ResultEngine, settlement::attach_settlement, store,
};

use super::Engine;

/// Everything a trip's expense screen shows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub trip_id: String,
    pub trip_name: String,
    pub total_expense: MoneyCents,
    pub expenses: Vec<Expense>,
    pub balances: Vec<Balance>,
}

impl Engine {
    /// Net balance of every participant, each with the payments they have to
    /// make to settle the trip.
    ///
    /// Derived from the ledger on every call. A ledger row pointing at an
    /// unknown user fails the whole computation.
    pub async fn balances(&self, trip_id: &str) -> ResultEngine<Vec<Balance>> {
        store::require_trip(&self.database, trip_id).await?;
        trip_balances(&self.database, trip_id).await
    }

    /// Trip name, expenses, their total and the balances.
    pub async fn summary(&self, trip_id: &str) -> ResultEngine<Summary> {
        let trip = store::require_trip(&self.database, trip_id).await?;
        let expenses = store::expenses_by_trip(&self.database, trip_id).await?;
        let total_expense = MoneyCents::checked_sum(expenses.iter().map(|e| e.amount))
            .ok_or_else(|| EngineError::InvalidAmount("expense total overflows".to_string()))?;
        let balances = trip_balances(&self.database, trip_id).await?;

        Ok(Summary {
            trip_id: trip.id,
            trip_name: trip.name,
            total_expense,
            expenses,
            balances,
        })
    }
}

async fn trip_balances<C: ConnectionTrait>(
    db: &C,
    trip_id: &str,
) -> ResultEngine<Vec<Balance>> {
    let rows = store::ledger_rows_by_trip(db, trip_id).await?;
    let user_ids: Vec<String> = rows.iter().map(|r| r.user_id.clone()).collect();
    let names = store::display_names(db, &user_ids).await?;

    let mut balances = rows
        .iter()
        .map(|row| {
            let name = names
                .get(&row.user_id)
                .ok_or_else(|| EngineError::KeyNotFound(format!("user {}", row.user_id)))?;
            Balance::from_row(row, name.as_str())
        })
        .collect::<ResultEngine<Vec<_>>>()?;

    match MoneyCents::checked_sum(balances.iter().map(|b| b.net_balance)) {
        Some(net) if net.is_zero() => {}
        Some(net) => tracing::warn!(trip_id, %net, "ledger net balances do not sum to zero"),
        None => tracing::warn!(trip_id, "ledger net balances overflow"),
    }

    let transactions = attach_settlement(&mut balances);
    tracing::debug!(
        trip_id,
        participants = balances.len(),
        transactions = transactions.len(),
        "computed trip balances"
    );
    Ok(balances)
}
