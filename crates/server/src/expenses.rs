//! Expense endpoints

use api_types::expense::{ExpenseNew, ExpenseView, ExpensesResponse, ShareView, Split};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{CustomAmount, ExpenseCmd, MoneyCents, SplitPolicy};

use crate::{ServerError, server::ServerState};

pub(crate) fn expense_view(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        trip_id: expense.trip_id,
        name: expense.name,
        category: expense.category,
        amount_minor: expense.amount.cents(),
        date: expense.date,
        payer_id: expense.payer_id,
        shares: expense
            .shares
            .into_iter()
            .map(|share| ShareView {
                user_id: share.user_id,
                amount_minor: share.amount.cents(),
            })
            .collect(),
    }
}

fn map_split(split: Split) -> SplitPolicy {
    match split {
        Split::Equal => SplitPolicy::Equal,
        Split::Custom(amounts) => SplitPolicy::Custom(
            amounts
                .into_iter()
                .map(|entry| CustomAmount::new(entry.user, MoneyCents::new(entry.amount_minor)))
                .collect(),
        ),
    }
}

pub async fn list(
    Extension(_user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
) -> Result<Json<ExpensesResponse>, ServerError> {
    let expenses = state
        .engine
        .list_expenses(&trip_id)
        .await?
        .into_iter()
        .map(expense_view)
        .collect();

    Ok(Json(ExpensesResponse { expenses }))
}

pub async fn add(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let mut cmd = ExpenseCmd::new(
        trip_id,
        user.id.as_str(),
        payload.name,
        MoneyCents::new(payload.amount_minor),
        payload.date.with_timezone(&Utc),
    )
    .policy(map_split(payload.split));
    if let Some(category) = payload.category {
        cmd = cmd.category(category);
    }
    if let Some(payer) = payload.payer {
        cmd = cmd.payer(payer);
    }

    let expense = state.engine.add_expense(cmd).await?;
    Ok((StatusCode::CREATED, Json(expense_view(expense))))
}
