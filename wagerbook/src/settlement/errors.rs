//! Settlement error taxonomy surfaced to provider adapters.
//!
//! Domain errors are expected business outcomes, returned as values with
//! enough detail for an adapter to choose its own status vocabulary; they are
//! not failures for logging or alerting purposes. `Internal` always means the
//! atomic unit rolled back and the call is safe to retry.

use crate::bets::{BetError, BetStatus};
use crate::wallet::WalletError;
use thiserror::Error;

/// Settlement errors
#[derive(Debug, Error)]
pub enum SettlementError {
    /// Malformed or missing canonical fields; rejected before touching storage
    #[error("Validation error: {0}")]
    Validation(String),

    /// No player identity, or no wallet row for the identity
    #[error("No user found")]
    NoUser,

    /// Stake exceeds the wallet balance
    #[error("Insufficient funds: available {available}, required {required}")]
    InsufficientFunds { available: i64, required: i64 },

    /// A bet with this transaction id already exists
    #[error("Bet already exists: {0}")]
    DuplicateTransaction(String),

    /// The referenced bet is already in a settled state; carries the current
    /// balance so adapters can answer success + already-processed
    #[error("Bet already settled")]
    AlreadySettled { balance: i64 },

    /// No bet matches the referenced transaction id
    #[error("Bet does not exist: {0}")]
    BetNotFound(String),

    /// The bet lifecycle does not permit the requested change
    #[error("Illegal transition: {from} -> {to}")]
    IllegalTransition { from: BetStatus, to: BetStatus },

    /// The caller's role does not permit this operation
    #[error("Operation not permitted for this caller")]
    Forbidden,

    /// Unexpected storage failure; the transaction rolled back
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SettlementError {
    /// Stable numeric wire code, matching the provider vocabulary of the
    /// operator platform (1xx caller problems, 2xx bet/balance problems,
    /// 999 unknown).
    pub fn wire_code(&self) -> u16 {
        match self {
            SettlementError::Validation(_) => 100,
            SettlementError::NoUser => 102,
            SettlementError::Forbidden => 105,
            SettlementError::InsufficientFunds { .. } => 201,
            SettlementError::DuplicateTransaction(_) => 202,
            SettlementError::AlreadySettled { .. } => 203,
            SettlementError::BetNotFound(_) => 204,
            SettlementError::IllegalTransition { .. } => 205,
            SettlementError::Internal(_) => 999,
        }
    }

    /// Machine-readable code for the canonical JSON result.
    pub fn code(&self) -> &'static str {
        match self {
            SettlementError::Validation(_) => "validation_error",
            SettlementError::NoUser => "no_user",
            SettlementError::Forbidden => "forbidden",
            SettlementError::InsufficientFunds { .. } => "insufficient_funds",
            SettlementError::DuplicateTransaction(_) => "duplicate_transaction",
            SettlementError::AlreadySettled { .. } => "already_settled",
            SettlementError::BetNotFound(_) => "bet_not_found",
            SettlementError::IllegalTransition { .. } => "illegal_transition",
            SettlementError::Internal(_) => "internal_error",
        }
    }

    /// Client-safe message that never leaks storage detail.
    pub fn client_message(&self) -> String {
        match self {
            SettlementError::Internal(_) => "Internal error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<WalletError> for SettlementError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::WalletNotFound(_) => SettlementError::NoUser,
            WalletError::InsufficientBalance {
                available,
                required,
            } => SettlementError::InsufficientFunds {
                available,
                required,
            },
            WalletError::InvalidAmount(amount) => {
                SettlementError::Validation(format!("invalid amount: {amount}"))
            }
            WalletError::BalanceOverflow => {
                SettlementError::Internal("balance overflow".to_string())
            }
            WalletError::WalletExists(user_id) => {
                SettlementError::Validation(format!("wallet already exists for user {user_id}"))
            }
            WalletError::Database(e) => SettlementError::Internal(e.to_string()),
        }
    }
}

impl From<BetError> for SettlementError {
    fn from(err: BetError) -> Self {
        match err {
            BetError::DuplicateTransaction(id) => SettlementError::DuplicateTransaction(id),
            BetError::NotFound(id) => SettlementError::BetNotFound(id),
            BetError::IllegalTransition { from, to } => {
                SettlementError::IllegalTransition { from, to }
            }
            BetError::Database(e) => SettlementError::Internal(e.to_string()),
        }
    }
}

impl From<sqlx::Error> for SettlementError {
    fn from(err: sqlx::Error) -> Self {
        SettlementError::Internal(err.to_string())
    }
}

/// Result type for settlement operations
pub type SettlementResult<T> = Result<T, SettlementError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_codes_match_provider_vocabulary() {
        assert_eq!(SettlementError::NoUser.wire_code(), 102);
        assert_eq!(
            SettlementError::InsufficientFunds {
                available: 0,
                required: 1
            }
            .wire_code(),
            201
        );
        assert_eq!(
            SettlementError::DuplicateTransaction("t".into()).wire_code(),
            202
        );
        assert_eq!(SettlementError::AlreadySettled { balance: 0 }.wire_code(), 203);
        assert_eq!(SettlementError::BetNotFound("t".into()).wire_code(), 204);
        assert_eq!(SettlementError::Internal("boom".into()).wire_code(), 999);
    }

    #[test]
    fn test_internal_message_is_sanitized() {
        let err = SettlementError::Internal("connection refused on 10.0.0.3:5432".into());
        assert_eq!(err.client_message(), "Internal error");
        assert_eq!(err.code(), "internal_error");
    }

    #[test]
    fn test_wallet_not_found_maps_to_no_user() {
        let err: SettlementError = WalletError::WalletNotFound(7).into();
        assert!(matches!(err, SettlementError::NoUser));
    }
}
