//! Bet registry error types.

use super::models::BetStatus;
use thiserror::Error;

/// Bet registry errors
#[derive(Debug, Error)]
pub enum BetError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bet with this transaction id already exists
    #[error("Duplicate transaction: {0}")]
    DuplicateTransaction(String),

    /// No bet with this transaction id
    #[error("Bet not found: {0}")]
    NotFound(String),

    /// The requested status change is not allowed by the lifecycle
    #[error("Illegal transition: {from} -> {to}")]
    IllegalTransition { from: BetStatus, to: BetStatus },
}

/// Result type for bet registry operations
pub type BetResult<T> = Result<T, BetError>;
