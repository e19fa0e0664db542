//! The module contains the error the engine can throw.
//!
//! The errors follow the taxonomy callers rely on:
//!
//! - validation: [`InvalidAmount`], [`InvalidExpense`], [`SplitMismatch`]
//! - not found: [`KeyNotFound`]
//! - conflict: [`ExistingKey`]
//! - state: [`NoParticipants`]
//! - storage: [`Database`]
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidExpense`]: EngineError::InvalidExpense
//!  [`SplitMismatch`]: EngineError::SplitMismatch
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`NoParticipants`]: EngineError::NoParticipants
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid expense: {0}")]
    InvalidExpense(String),
    #[error("Split mismatch: {0}")]
    SplitMismatch(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("No participants registered for trip {0}")]
    NoParticipants(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` for errors raised before any store access.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_) | Self::InvalidExpense(_) | Self::SplitMismatch(_)
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidExpense(a), Self::InvalidExpense(b)) => a == b,
            (Self::SplitMismatch(a), Self::SplitMismatch(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::NoParticipants(a), Self::NoParticipants(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
