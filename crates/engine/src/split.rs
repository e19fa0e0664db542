//! Split calculator: turns one expense total and a [`SplitPolicy`] into the
//! list of per-user [`Share`]s.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, Share};

/// One caller-provided amount in a custom split.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomAmount {
    pub user_id: String,
    pub amount: MoneyCents,
}

impl CustomAmount {
    pub fn new(user_id: impl Into<String>, amount: MoneyCents) -> Self {
        Self {
            user_id: user_id.into(),
            amount,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amounts", rename_all = "snake_case")]
pub enum SplitPolicy {
    /// Divide evenly across everyone registered for expense splitting on the
    /// trip.
    #[default]
    Equal,
    /// Use the named amounts. Users with a zero amount owe nothing, unless no
    /// amount is positive: then the named users split evenly.
    Custom(Vec<CustomAmount>),
}

/// Computes the shares of an expense.
///
/// `trip_participants` is only consulted by [`SplitPolicy::Equal`]. It is
/// sorted by user id first, so the cent left over by an uneven division always
/// lands on the same users.
pub fn compute_shares(
    trip_id: &str,
    expense_id: Uuid,
    amount: MoneyCents,
    policy: &SplitPolicy,
    trip_participants: &[String],
) -> ResultEngine<Vec<Share>> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount(
            "expense amount must be > 0".to_string(),
        ));
    }

    match policy {
        SplitPolicy::Equal => {
            if trip_participants.is_empty() {
                return Err(EngineError::NoParticipants(trip_id.to_string()));
            }
            split_equally(expense_id, amount, trip_participants)
        }
        SplitPolicy::Custom(amounts) => split_custom(expense_id, amount, amounts),
    }
}

fn split_equally(
    expense_id: Uuid,
    amount: MoneyCents,
    participants: &[String],
) -> ResultEngine<Vec<Share>> {
    let mut sorted: Vec<&String> = participants.iter().collect();
    sorted.sort();
    sorted.dedup();

    let parts = amount.split_even(sorted.len()).ok_or_else(|| {
        EngineError::InvalidExpense("equal split needs at least one participant".to_string())
    })?;

    Ok(sorted
        .into_iter()
        .zip(parts)
        .map(|(user_id, part)| Share::new(expense_id, user_id.clone(), part))
        .collect())
}

fn split_custom(
    expense_id: Uuid,
    amount: MoneyCents,
    amounts: &[CustomAmount],
) -> ResultEngine<Vec<Share>> {
    if amounts.is_empty() {
        return Err(EngineError::InvalidExpense(
            "custom split needs at least one participant".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for entry in amounts {
        if entry.user_id.trim().is_empty() {
            return Err(EngineError::InvalidExpense(
                "custom split user must not be empty".to_string(),
            ));
        }
        if !seen.insert(entry.user_id.as_str()) {
            return Err(EngineError::InvalidExpense(format!(
                "user {} appears twice in custom split",
                entry.user_id
            )));
        }
        if entry.amount.is_negative() {
            return Err(EngineError::InvalidAmount(format!(
                "custom amount for {} must be >= 0",
                entry.user_id
            )));
        }
    }

    let positive: Vec<&CustomAmount> = amounts.iter().filter(|e| e.amount.is_positive()).collect();
    if positive.is_empty() {
        tracing::debug!(
            participants = amounts.len(),
            "no positive custom amount, falling back to equal split"
        );
        let named: Vec<String> = amounts.iter().map(|e| e.user_id.clone()).collect();
        return split_equally(expense_id, amount, &named);
    }

    let allocated = MoneyCents::checked_sum(positive.iter().map(|e| e.amount))
        .ok_or_else(|| EngineError::InvalidAmount("custom amounts overflow".to_string()))?;
    if allocated != amount {
        return Err(EngineError::SplitMismatch(format!(
            "custom amounts add up to {allocated}, expense total is {amount}"
        )));
    }

    Ok(positive
        .into_iter()
        .map(|e| Share::new(expense_id, e.user_id.clone(), e.amount))
        .collect())
}
