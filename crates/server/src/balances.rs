//! Balances and trip summary.

use api_types::balance::{BalanceView, BalancesResponse, SettlementView, SummaryResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{ServerError, expenses::expense_view, server::ServerState};

fn balance_view(balance: engine::Balance) -> BalanceView {
    BalanceView {
        user_id: balance.user_id,
        display_name: balance.display_name,
        income_minor: balance.income.cents(),
        outcome_minor: balance.outcome.cents(),
        net_balance_minor: balance.net_balance.cents(),
        transactions: balance
            .transactions
            .into_iter()
            .map(|tx| SettlementView {
                from_user_id: tx.from_user_id,
                to_user_id: tx.to_user_id,
                amount_minor: tx.amount.cents(),
            })
            .collect(),
    }
}

pub async fn balances(
    Extension(_user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
) -> Result<Json<BalancesResponse>, ServerError> {
    let balances = state
        .engine
        .balances(&trip_id)
        .await?
        .into_iter()
        .map(balance_view)
        .collect();

    Ok(Json(BalancesResponse { balances }))
}

pub async fn summary(
    Extension(_user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
) -> Result<Json<SummaryResponse>, ServerError> {
    let summary = state.engine.summary(&trip_id).await?;

    Ok(Json(SummaryResponse {
        trip_id: summary.trip_id,
        trip_name: summary.trip_name,
        total_expense_minor: summary.total_expense.cents(),
        expenses: summary.expenses.into_iter().map(expense_view).collect(),
        balances: summary.balances.into_iter().map(balance_view).collect(),
    }))
}
