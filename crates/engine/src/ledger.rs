//! Per-trip, per-user ledger rows (`expense_users` table).
//!
//! Each [`LedgerRow`] keeps two running totals for one user on one trip:
//! `income` (expense totals the user paid for the group) and `outcome` (the
//! user's own shares). Rows are created lazily and never deleted.
//!
//! [`LedgerBook`] is the in-memory view of all rows of one trip, keyed by user
//! id. Applying an expense to it marks the touched rows so the store only
//! writes what changed.

use std::collections::BTreeMap;

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Expense, MoneyCents, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub id: Uuid,
    pub trip_id: String,
    pub user_id: String,
    pub income: MoneyCents,
    pub outcome: MoneyCents,
}

impl LedgerRow {
    /// A zero-valued row.
    pub fn new(trip_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            trip_id: trip_id.into(),
            user_id: user_id.into(),
            income: MoneyCents::ZERO,
            outcome: MoneyCents::ZERO,
        }
    }

    /// `income - outcome`: positive means the user is owed money. `None` if
    /// the difference does not fit in an `i64`.
    pub fn net_balance(&self) -> Option<MoneyCents> {
        self.income.checked_sub(self.outcome)
    }
}

/// A row write produced by [`LedgerBook::changes`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerChange {
    Insert(LedgerRow),
    Update(LedgerRow),
}

impl LedgerChange {
    pub fn row(&self) -> &LedgerRow {
        match self {
            Self::Insert(row) | Self::Update(row) => row,
        }
    }
}

#[derive(Debug)]
struct Slot {
    row: LedgerRow,
    stored: bool,
    dirty: bool,
}

#[derive(Debug)]
pub struct LedgerBook {
    trip_id: String,
    slots: BTreeMap<String, Slot>,
}

impl LedgerBook {
    /// Builds the book from the rows already stored for `trip_id`.
    pub fn new(trip_id: impl Into<String>, rows: impl IntoIterator<Item = LedgerRow>) -> Self {
        let slots = rows
            .into_iter()
            .map(|row| {
                (
                    row.user_id.clone(),
                    Slot {
                        row,
                        stored: true,
                        dirty: false,
                    },
                )
            })
            .collect();
        Self {
            trip_id: trip_id.into(),
            slots,
        }
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.slots.contains_key(user_id)
    }

    /// User ids of every registered participant, sorted.
    pub fn participant_ids(&self) -> Vec<String> {
        self.slots.keys().cloned().collect()
    }

    pub fn row(&self, user_id: &str) -> Option<&LedgerRow> {
        self.slots.get(user_id).map(|slot| &slot.row)
    }

    pub fn rows(&self) -> impl Iterator<Item = &LedgerRow> {
        self.slots.values().map(|slot| &slot.row)
    }

    /// Returns the user's row, creating a zero-valued one if missing. The row
    /// is marked as changed either way.
    pub fn find_or_create(&mut self, user_id: &str) -> &mut LedgerRow {
        let trip_id = &self.trip_id;
        let slot = self
            .slots
            .entry(user_id.to_string())
            .or_insert_with(|| Slot {
                row: LedgerRow::new(trip_id.clone(), user_id),
                stored: false,
                dirty: true,
            });
        slot.dirty = true;
        &mut slot.row
    }

    /// Credits the payer with the full expense total and charges every share
    /// to its user.
    ///
    /// The payer is credited exactly once, whether or not they also owe a
    /// share. New totals are computed before any row is touched, so an
    /// overflowing total leaves the book unchanged.
    pub fn apply_expense(&mut self, expense: &Expense) -> ResultEngine<()> {
        let overflow = || {
            EngineError::InvalidAmount(format!("ledger totals overflow for expense {}", expense.id))
        };

        // user id -> (income, outcome)
        let mut totals: BTreeMap<&str, (MoneyCents, MoneyCents)> = BTreeMap::new();
        let current = |user_id: &str| -> (MoneyCents, MoneyCents) {
            self.row(user_id)
                .map_or((MoneyCents::ZERO, MoneyCents::ZERO), |row| {
                    (row.income, row.outcome)
                })
        };

        for share in &expense.shares {
            let entry = totals
                .entry(share.user_id.as_str())
                .or_insert_with(|| current(&share.user_id));
            entry.1 = entry.1.checked_add(share.amount).ok_or_else(overflow)?;
        }
        let payer = totals
            .entry(expense.payer_id.as_str())
            .or_insert_with(|| current(&expense.payer_id));
        payer.0 = payer.0.checked_add(expense.amount).ok_or_else(overflow)?;

        for (user_id, (income, outcome)) in totals {
            let row = self.find_or_create(user_id);
            row.income = income;
            row.outcome = outcome;
        }

        tracing::debug!(
            trip_id = %self.trip_id,
            expense_id = %expense.id,
            shares = expense.shares.len(),
            "applied expense to ledger"
        );
        Ok(())
    }

    /// Rows created or modified since the book was loaded.
    pub fn changes(&self) -> Vec<LedgerChange> {
        self.slots
            .values()
            .filter(|slot| slot.dirty)
            .map(|slot| {
                if slot.stored {
                    LedgerChange::Update(slot.row.clone())
                } else {
                    LedgerChange::Insert(slot.row.clone())
                }
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub trip_id: String,
    pub user_id: String,
    pub income_minor: i64,
    pub outcome_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trips::Entity",
        from = "Column::TripId",
        to = "super::trips::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Trips,
}

impl Related<super::trips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trips.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerRow> for ActiveModel {
    fn from(row: &LedgerRow) -> Self {
        Self {
            id: ActiveValue::Set(row.id.to_string()),
            trip_id: ActiveValue::Set(row.trip_id.clone()),
            user_id: ActiveValue::Set(row.user_id.clone()),
            income_minor: ActiveValue::Set(row.income.cents()),
            outcome_minor: ActiveValue::Set(row.outcome.cents()),
        }
    }
}

impl TryFrom<Model> for LedgerRow {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "ledger row")?,
            trip_id: model.trip_id,
            user_id: model.user_id,
            income: MoneyCents::new(model.income_minor),
            outcome: MoneyCents::new(model.outcome_minor),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::Share;

    fn expense(payer: &str, amount: i64, shares: &[(&str, i64)]) -> Expense {
        let mut expense = Expense::new(
            "trip".to_string(),
            "Dinner".to_string(),
            None,
            MoneyCents::new(amount),
            Utc::now(),
            payer.to_string(),
            payer.to_string(),
        )
        .unwrap();
        expense.shares = shares
            .iter()
            .map(|(user, cents)| Share::new(expense.id, *user, MoneyCents::new(*cents)))
            .collect();
        expense
    }

    fn totals(book: &LedgerBook, user: &str) -> (i64, i64) {
        let row = book.row(user).unwrap();
        (row.income.cents(), row.outcome.cents())
    }

    #[test]
    fn payer_with_share_is_credited_full_total() {
        let mut book = LedgerBook::new("trip", Vec::new());
        book.apply_expense(&expense(
            "a",
            300_000,
            &[("a", 100_000), ("b", 100_000), ("c", 100_000)],
        ))
        .unwrap();

        assert_eq!(totals(&book, "a"), (300_000, 100_000));
        assert_eq!(totals(&book, "b"), (0, 100_000));
        assert_eq!(totals(&book, "c"), (0, 100_000));
        assert_eq!(book.row("a").unwrap().net_balance().unwrap().cents(), 200_000);
    }

    #[test]
    fn payer_without_share_is_still_credited_once() {
        let mut book = LedgerBook::new(
            "trip",
            vec![LedgerRow::new("trip", "a"), LedgerRow::new("trip", "b")],
        );
        book.apply_expense(&expense("b", 90_000, &[("a", 60_000), ("c", 30_000)]))
            .unwrap();

        assert_eq!(totals(&book, "a"), (0, 60_000));
        assert_eq!(totals(&book, "b"), (90_000, 0));
        assert_eq!(totals(&book, "c"), (0, 30_000));
    }

    #[test]
    fn changes_split_inserts_and_updates() {
        let stored = LedgerRow::new("trip", "a");
        let untouched = LedgerRow::new("trip", "z");
        let mut book = LedgerBook::new("trip", vec![stored.clone(), untouched]);
        book.apply_expense(&expense("a", 100, &[("a", 50), ("b", 50)])).unwrap();

        let changes = book.changes();
        assert_eq!(changes.len(), 2);
        assert!(matches!(&changes[0], LedgerChange::Update(row) if row.id == stored.id));
        assert!(matches!(&changes[1], LedgerChange::Insert(row) if row.user_id == "b"));
    }

    #[test]
    fn ledger_stays_zero_sum() {
        let mut book = LedgerBook::new("trip", Vec::new());
        book.apply_expense(&expense("a", 1001, &[("a", 334), ("b", 334), ("c", 333)]))
            .unwrap();
        book.apply_expense(&expense("c", 500, &[("a", 500)])).unwrap();

        let income: MoneyCents = book.rows().map(|r| r.income).sum();
        let outcome: MoneyCents = book.rows().map(|r| r.outcome).sum();
        assert_eq!(income, MoneyCents::new(1501));
        assert_eq!(outcome, MoneyCents::new(1501));
        let net = MoneyCents::checked_sum(book.rows().map(|r| r.net_balance().unwrap()));
        assert_eq!(net, Some(MoneyCents::ZERO));
    }

    #[test]
    fn overflowing_totals_leave_the_book_untouched() {
        let mut book = LedgerBook::new("trip", Vec::new());
        let half = i64::MAX / 2;
        book.apply_expense(&expense("a", i64::MAX, &[("a", half), ("b", half + 1)]))
            .unwrap();
        let before: Vec<LedgerRow> = book.rows().cloned().collect();

        let err = book.apply_expense(&expense("a", 1, &[("b", 1)])).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
        assert_eq!(book.rows().cloned().collect::<Vec<_>>(), before);
    }

    #[test]
    fn net_balance_reports_overflow() {
        let mut row = LedgerRow::new("trip", "a");
        row.income = MoneyCents::new(i64::MAX);
        row.outcome = MoneyCents::new(-1);
        assert!(row.net_balance().is_none());
    }
}
