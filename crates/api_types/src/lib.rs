//! Request/response bodies of the HTTP API.
//!
//! Amounts are integer minor units (`*_minor`, e.g. cents) everywhere.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod trip {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TripNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TripView {
        pub id: String,
        pub name: String,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod participant {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantNew {
        /// User id or handle (`alice` or `@alice`).
        pub user: String,
    }

    /// One ledger row: cumulative totals of a user on a trip.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantView {
        pub id: Uuid,
        pub trip_id: String,
        pub user_id: String,
        pub income_minor: i64,
        pub outcome_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantsResponse {
        pub participants: Vec<ParticipantView>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CustomAmount {
        /// User id or handle.
        pub user: String,
        pub amount_minor: i64,
    }

    /// How an expense is divided.
    ///
    /// `{"kind": "equal"}` splits across every trip participant;
    /// `{"kind": "custom", "amounts": [...]}` uses the given amounts.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "kind", content = "amounts", rename_all = "snake_case")]
    pub enum Split {
        #[default]
        Equal,
        Custom(Vec<CustomAmount>),
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub name: String,
        pub category: Option<String>,
        /// Must be > 0.
        pub amount_minor: i64,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub date: DateTime<FixedOffset>,
        /// User id or handle of whoever paid. Defaults to the caller.
        pub payer: Option<String>,
        #[serde(default)]
        pub split: Split,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareView {
        pub user_id: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub trip_id: String,
        pub name: String,
        pub category: Option<String>,
        pub amount_minor: i64,
        pub date: DateTime<Utc>,
        pub payer_id: String,
        pub shares: Vec<ShareView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpensesResponse {
        pub expenses: Vec<ExpenseView>,
    }
}

pub mod balance {
    use super::*;

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SettlementView {
        pub from_user_id: String,
        pub to_user_id: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub user_id: String,
        pub display_name: String,
        pub income_minor: i64,
        pub outcome_minor: i64,
        /// Positive: the user is owed money. Negative: the user owes money.
        pub net_balance_minor: i64,
        /// Payments this user has to make.
        pub transactions: Vec<SettlementView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancesResponse {
        pub balances: Vec<BalanceView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryResponse {
        pub trip_id: String,
        pub trip_name: String,
        pub total_expense_minor: i64,
        pub expenses: Vec<super::expense::ExpenseView>,
        pub balances: Vec<BalanceView>,
    }
}
