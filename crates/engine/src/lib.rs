//! Expense splitting and debt settlement for shared trips.
//!
//! The engine records shared expenses, keeps a cumulative income/outcome
//! ledger per user and trip, and derives net balances plus the payments that
//! settle them:
//!
//! - [`split`]: one expense + a [`SplitPolicy`] becomes a list of [`Share`]s.
//! - [`LedgerBook`]: applies an expense to the per-user ledger rows.
//! - [`settlement`]: net balances and the greedy settlement matcher.
//!
//! [`Engine`] wires them to the database (sea-orm).

pub use commands::ExpenseCmd;
pub use error::EngineError;
pub use expenses::Expense;
pub use ledger::{LedgerBook, LedgerChange, LedgerRow};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, Summary};
pub use settlement::{Balance, SettlementTransaction, attach_settlement, settle};
pub use shares::Share;
pub use split::{CustomAmount, SplitPolicy, compute_shares};
pub use store::ExpenseUnitOfWork;
pub use trips::Trip;
pub use users::User;

mod commands;
mod error;
mod expenses;
mod ledger;
mod money;
mod ops;
pub mod settlement;
mod shares;
pub mod split;
mod store;
mod trips;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
