//! Storage adapters on top of sea-orm.
//!
//! Every function takes any [`ConnectionTrait`], so the same code runs on the
//! plain connection for reads and inside a `DatabaseTransaction` for writes.
//! The engine never writes outside [`commit_expense`] and the small
//! single-row helpers below.

use std::collections::HashMap;

use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, prelude::*};

use crate::{
    EngineError, Expense, LedgerChange, LedgerRow, ResultEngine, expenses, ledger, shares, trips,
    users::{self, User},
    util::normalize_handle,
};

/// Everything one `add_expense` call writes: the expense with its shares and
/// the ledger rows it touches.
///
/// The unit is computed in full before any write, and applied inside a single
/// database transaction by [`commit_expense`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseUnitOfWork {
    pub expense: Expense,
    pub ledger: Vec<LedgerChange>,
}

pub(crate) async fn require_trip<C: ConnectionTrait>(
    db: &C,
    trip_id: &str,
) -> ResultEngine<trips::Model> {
    trips::Entity::find_by_id(trip_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("trip not exists".to_string()))
}

/// All ledger rows of a trip, ordered by user id.
pub(crate) async fn ledger_rows_by_trip<C: ConnectionTrait>(
    db: &C,
    trip_id: &str,
) -> ResultEngine<Vec<LedgerRow>> {
    ledger::Entity::find()
        .filter(ledger::Column::TripId.eq(trip_id))
        .order_by_asc(ledger::Column::UserId)
        .all(db)
        .await?
        .into_iter()
        .map(LedgerRow::try_from)
        .collect()
}

/// Returns the user's row on the trip, inserting a zero-valued one when
/// missing. The flag is `true` when the row was created.
pub(crate) async fn find_or_create_ledger_row<C: ConnectionTrait>(
    db: &C,
    trip_id: &str,
    user_id: &str,
) -> ResultEngine<(LedgerRow, bool)> {
    let existing = ledger::Entity::find()
        .filter(ledger::Column::TripId.eq(trip_id))
        .filter(ledger::Column::UserId.eq(user_id))
        .one(db)
        .await?;
    if let Some(model) = existing {
        return Ok((LedgerRow::try_from(model)?, false));
    }

    let row = LedgerRow::new(trip_id, user_id);
    ledger::ActiveModel::from(&row).insert(db).await?;
    Ok((row, true))
}

async fn write_ledger_change<C: ConnectionTrait>(
    db: &C,
    change: &LedgerChange,
) -> ResultEngine<()> {
    let model = ledger::ActiveModel::from(change.row());
    match change {
        LedgerChange::Insert(_) => {
            model.insert(db).await?;
        }
        LedgerChange::Update(_) => {
            model.update(db).await?;
        }
    }
    Ok(())
}

/// Writes the expense, its shares and the ledger changes.
///
/// Callers run this inside one database transaction so either everything
/// lands or nothing does.
pub(crate) async fn commit_expense<C: ConnectionTrait>(
    db: &C,
    unit: &ExpenseUnitOfWork,
) -> ResultEngine<()> {
    expenses::ActiveModel::from(&unit.expense).insert(db).await?;
    for (position, share) in unit.expense.shares.iter().enumerate() {
        let position = i32::try_from(position)
            .map_err(|_| EngineError::InvalidExpense("too many shares".to_string()))?;
        shares::ActiveModel::from_share(share, position)
            .insert(db)
            .await?;
    }
    for change in &unit.ledger {
        write_ledger_change(db, change).await?;
    }
    Ok(())
}

/// All expenses of a trip with their shares, oldest first.
pub(crate) async fn expenses_by_trip<C: ConnectionTrait>(
    db: &C,
    trip_id: &str,
) -> ResultEngine<Vec<Expense>> {
    let models = expenses::Entity::find()
        .filter(expenses::Column::TripId.eq(trip_id))
        .order_by_asc(expenses::Column::Date)
        .order_by_asc(expenses::Column::Id)
        .all(db)
        .await?;
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
    let mut shares_by_expense: HashMap<String, Vec<shares::Model>> = HashMap::new();
    for share in shares::Entity::find()
        .filter(shares::Column::ExpenseId.is_in(ids))
        .all(db)
        .await?
    {
        shares_by_expense
            .entry(share.expense_id.clone())
            .or_default()
            .push(share);
    }

    models
        .into_iter()
        .map(|model| {
            let shares = shares_by_expense.remove(&model.id).unwrap_or_default();
            Expense::try_from((model, shares))
        })
        .collect()
}

pub(crate) async fn user_model_by_handle<C: ConnectionTrait>(
    db: &C,
    handle: &str,
) -> ResultEngine<Option<users::Model>> {
    let Some(handle) = normalize_handle(handle) else {
        return Ok(None);
    };
    users::Entity::find()
        .filter(users::Column::Username.eq(handle))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Resolves a user id or a handle (with or without `@`) to a user.
pub(crate) async fn resolve_user<C: ConnectionTrait>(
    db: &C,
    id_or_handle: &str,
) -> ResultEngine<User> {
    let key = id_or_handle.trim();
    if let Some(model) = users::Entity::find_by_id(key.to_string()).one(db).await? {
        return Ok(model.into());
    }
    user_model_by_handle(db, key)
        .await?
        .map(User::from)
        .ok_or_else(|| EngineError::KeyNotFound(format!("user {key}")))
}

/// Display names for `user_ids`. Any unknown id fails the whole lookup.
pub(crate) async fn display_names<C: ConnectionTrait>(
    db: &C,
    user_ids: &[String],
) -> ResultEngine<HashMap<String, String>> {
    let found: HashMap<String, String> = users::Entity::find()
        .filter(users::Column::Id.is_in(user_ids.to_vec()))
        .all(db)
        .await?
        .into_iter()
        .map(|model| {
            let user = User::from(model);
            (user.id.clone(), user.display_name().to_string())
        })
        .collect();

    if let Some(missing) = user_ids.iter().find(|id| !found.contains_key(*id)) {
        return Err(EngineError::KeyNotFound(format!("user {missing}")));
    }
    Ok(found)
}
