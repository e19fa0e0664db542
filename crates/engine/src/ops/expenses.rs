use sea_orm::{ConnectionTrait, DatabaseTransaction};

use crate::{
    EngineError, Expense, ExpenseCmd, LedgerBook, ResultEngine, SplitPolicy,
    split::compute_shares,
    store::{self, ExpenseUnitOfWork},
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, with_tx};

impl Engine {
    /// Records an expense: validates it, splits it, then writes the expense,
    /// its shares and the affected ledger rows.
    ///
    /// Reads and writes share one database transaction, so a failure at any
    /// step leaves neither the expense nor any ledger change behind.
    pub async fn add_expense(&self, cmd: ExpenseCmd) -> ResultEngine<Expense> {
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "expense amount must be > 0".to_string(),
            ));
        }
        let name = normalize_required_name(&cmd.name, "expense name")?;
        if cmd.payer.trim().is_empty() {
            return Err(EngineError::InvalidExpense(
                "payer must not be empty".to_string(),
            ));
        }

        let unit = with_tx!(self, |db_tx| record_expense(&db_tx, cmd, name).await)?;

        tracing::info!(
            trip_id = %unit.expense.trip_id,
            expense_id = %unit.expense.id,
            amount = %unit.expense.amount,
            shares = unit.expense.shares.len(),
            ledger_rows = unit.ledger.len(),
            "expense recorded"
        );
        Ok(unit.expense)
    }

    /// Expenses of a trip with their shares, oldest first.
    pub async fn list_expenses(&self, trip_id: &str) -> ResultEngine<Vec<Expense>> {
        store::require_trip(&self.database, trip_id).await?;
        store::expenses_by_trip(&self.database, trip_id).await
    }
}

async fn record_expense(
    db_tx: &DatabaseTransaction,
    cmd: ExpenseCmd,
    name: String,
) -> ResultEngine<ExpenseUnitOfWork> {
    let unit = plan_expense(db_tx, cmd, name).await?;
    store::commit_expense(db_tx, &unit).await?;
    Ok(unit)
}

/// Builds the full unit of work for an expense without writing anything.
async fn plan_expense<C: ConnectionTrait>(
    db: &C,
    cmd: ExpenseCmd,
    name: String,
) -> ResultEngine<ExpenseUnitOfWork> {
    store::require_trip(db, &cmd.trip_id).await?;
    let payer = store::resolve_user(db, &cmd.payer).await?;
    let created_by = store::resolve_user(db, &cmd.user_id).await?;

    let mut expense = Expense::new(
        cmd.trip_id.clone(),
        name,
        normalize_optional_text(cmd.category.as_deref()),
        cmd.amount,
        cmd.date,
        payer.id,
        created_by.id,
    )?;

    let mut book = LedgerBook::new(
        cmd.trip_id.as_str(),
        store::ledger_rows_by_trip(db, &cmd.trip_id).await?,
    );

    // Custom splits may name users by handle; shares always carry ids.
    let policy = match cmd.policy {
        SplitPolicy::Equal => SplitPolicy::Equal,
        SplitPolicy::Custom(amounts) => {
            let mut resolved = Vec::with_capacity(amounts.len());
            for mut entry in amounts {
                entry.user_id = store::resolve_user(db, &entry.user_id).await?.id;
                resolved.push(entry);
            }
            SplitPolicy::Custom(resolved)
        }
    };

    expense.shares = compute_shares(
        &expense.trip_id,
        expense.id,
        expense.amount,
        &policy,
        &book.participant_ids(),
    )?;
    debug_assert_eq!(expense.shares_total(), expense.amount);

    book.apply_expense(&expense)?;
    Ok(ExpenseUnitOfWork {
        ledger: book.changes(),
        expense,
    })
}
