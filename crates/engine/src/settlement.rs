//! Balance aggregation and settlement.
//!
//! [`Balance`]s are derived from the ledger on every read and never stored.
//! [`settle`] turns them into directed payments with a greedy matcher: the
//! first debtor pays the first creditor as much as both can take, whoever
//! reaches zero leaves the queue, repeat.

use serde::{Deserialize, Serialize};

use crate::{EngineError, LedgerRow, MoneyCents, ResultEngine};

/// A suggested payment from a debtor to a creditor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementTransaction {
    pub from_user_id: String,
    pub to_user_id: String,
    pub amount: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub user_id: String,
    pub display_name: String,
    pub income: MoneyCents,
    pub outcome: MoneyCents,
    pub net_balance: MoneyCents,
    /// Payments this user has to make (the user is always `from_user_id`).
    pub transactions: Vec<SettlementTransaction>,
}

impl Balance {
    /// Fails with `InvalidAmount` when the row's net balance overflows.
    pub fn from_row(row: &LedgerRow, display_name: impl Into<String>) -> ResultEngine<Self> {
        let net_balance = row.net_balance().ok_or_else(|| {
            EngineError::InvalidAmount(format!("net balance of {} overflows", row.user_id))
        })?;
        Ok(Self {
            user_id: row.user_id.clone(),
            display_name: display_name.into(),
            income: row.income,
            outcome: row.outcome,
            net_balance,
            transactions: Vec::new(),
        })
    }
}

#[derive(Debug)]
struct Party<'a> {
    user_id: &'a str,
    /// Always positive while queued: what the debtor still owes or the
    /// creditor is still owed.
    outstanding: MoneyCents,
}

/// Computes the settlement payments for `balances`.
///
/// Creditors and debtors are queued by user id, so the result only depends
/// on the set of balances, not on the order the store returned them in.
/// Matching the largest amounts first would usually need fewer payments; the
/// greedy walk already stays within `creditors + debtors - 1`.
pub fn settle(balances: &[Balance]) -> Vec<SettlementTransaction> {
    let mut creditors: Vec<Party<'_>> = balances
        .iter()
        .filter(|b| b.net_balance.is_positive())
        .map(|b| Party {
            user_id: &b.user_id,
            outstanding: b.net_balance,
        })
        .collect();
    let mut debtors: Vec<Party<'_>> = balances
        .iter()
        .filter(|b| b.net_balance.is_negative())
        .map(|b| Party {
            user_id: &b.user_id,
            outstanding: b.net_balance.abs(),
        })
        .collect();
    creditors.sort_by(|a, b| a.user_id.cmp(b.user_id));
    debtors.sort_by(|a, b| a.user_id.cmp(b.user_id));

    let mut transactions = Vec::new();
    let (mut ci, mut di) = (0, 0);
    while ci < creditors.len() && di < debtors.len() {
        let creditor = &mut creditors[ci];
        let debtor = &mut debtors[di];

        let amount = debtor.outstanding.min(creditor.outstanding);
        if amount.is_positive() {
            transactions.push(SettlementTransaction {
                from_user_id: debtor.user_id.to_string(),
                to_user_id: creditor.user_id.to_string(),
                amount,
            });
            debtor.outstanding -= amount;
            creditor.outstanding -= amount;
        }

        if !debtor.outstanding.is_positive() {
            di += 1;
        }
        if !creditor.outstanding.is_positive() {
            ci += 1;
        }
    }

    let left = &debtors[di.min(debtors.len())..];
    if !left.is_empty() {
        let residual = MoneyCents::checked_sum(left.iter().map(|d| d.outstanding));
        tracing::warn!(
            ?residual,
            debtors = left.len(),
            "ledger is not zero-sum, debts left unsettled"
        );
    }

    transactions
}

/// Runs [`settle`] and attaches every payment to the balance of the user who
/// makes it.
pub fn attach_settlement(balances: &mut [Balance]) -> Vec<SettlementTransaction> {
    let transactions = settle(balances);
    for balance in balances.iter_mut() {
        balance.transactions = transactions
            .iter()
            .filter(|t| t.from_user_id == balance.user_id)
            .cloned()
            .collect();
    }
    transactions
}
