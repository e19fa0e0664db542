//! Command structs for engine write operations.
//!
//! These types group the parameters of `add_expense`, keeping call sites
//! readable and avoiding long argument lists.

use chrono::{DateTime, Utc};

use crate::{CustomAmount, MoneyCents, SplitPolicy};

/// Record a shared expense on a trip.
#[derive(Clone, Debug)]
pub struct ExpenseCmd {
    pub trip_id: String,
    pub name: String,
    pub category: Option<String>,
    pub amount: MoneyCents,
    pub date: DateTime<Utc>,
    /// User id or handle of whoever fronted the money.
    pub payer: String,
    pub policy: SplitPolicy,
    /// User submitting the expense.
    pub user_id: String,
}

impl ExpenseCmd {
    /// An equally split expense paid by `user_id`.
    #[must_use]
    pub fn new(
        trip_id: impl Into<String>,
        user_id: impl Into<String>,
        name: impl Into<String>,
        amount: MoneyCents,
        date: DateTime<Utc>,
    ) -> Self {
        let user_id = user_id.into();
        Self {
            trip_id: trip_id.into(),
            name: name.into(),
            category: None,
            amount,
            date,
            payer: user_id.clone(),
            policy: SplitPolicy::Equal,
            user_id,
        }
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn payer(mut self, payer: impl Into<String>) -> Self {
        self.payer = payer.into();
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: SplitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Switches to a custom split with the given `(user, amount)` pairs.
    #[must_use]
    pub fn custom_amounts<I, U>(self, amounts: I) -> Self
    where
        I: IntoIterator<Item = (U, MoneyCents)>,
        U: Into<String>,
    {
        self.policy(SplitPolicy::Custom(
            amounts
                .into_iter()
                .map(|(user, amount)| CustomAmount::new(user, amount))
                .collect(),
        ))
    }
}
