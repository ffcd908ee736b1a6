//! Wallet error types.

use thiserror::Error;

/// Wallet errors
#[derive(Debug, Error)]
pub enum WalletError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Insufficient balance
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: i64, required: i64 },

    /// Wallet not found
    #[error("Wallet not found for user {0}")]
    WalletNotFound(i64),

    /// Wallet already exists for this user
    #[error("Wallet already exists for user {0}")]
    WalletExists(i64),

    /// Balance arithmetic would overflow
    #[error("Balance overflow")]
    BalanceOverflow,

    /// Invalid amount (must not be negative)
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),
}

/// Result type for wallet operations
pub type WalletResult<T> = Result<T, WalletError>;
