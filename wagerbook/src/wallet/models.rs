//! Wallet data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Wallet model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub user_id: i64,
    pub balance: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ledger row model (append-only transaction log)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub wallet_id: i64,
    pub receiver_user_id: Option<i64>,
    pub sender_user_id: Option<i64>,
    pub operator_id: Option<i64>,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub hash: String,
    pub kind: TransactionKind,
    pub accepted: bool,
    pub meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Direction of a ledger row relative to the wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Deposit => write!(f, "deposit"),
            TransactionKind::Withdraw => write!(f, "withdraw"),
        }
    }
}

/// Counterparty and audit metadata attached to a single balance adjustment.
///
/// The delta's sign decides the row type: non-negative deltas append a
/// `deposit` row, negative deltas a `withdraw` row, always with the absolute
/// amount.
#[derive(Debug, Clone, Default)]
pub struct LedgerDescriptor {
    pub receiver_user_id: Option<i64>,
    pub sender_user_id: Option<i64>,
    pub operator_id: Option<i64>,
    pub meta: serde_json::Value,
}

impl LedgerDescriptor {
    /// Descriptor for a provider-driven settlement movement on one wallet.
    pub fn settlement(user_id: i64, operator_id: Option<i64>, meta: serde_json::Value) -> Self {
        Self {
            receiver_user_id: Some(user_id),
            sender_user_id: Some(user_id),
            operator_id,
            meta,
        }
    }
}

/// Generate a fresh ledger row hash.
///
/// Hashes a random nonce together with the row's wallet and amount so two
/// adjustments of the same size on the same wallet still get distinct hashes.
pub fn ledger_hash(wallet_id: i64, amount: i64) -> String {
    let nonce = Uuid::new_v4();
    let digest = Sha256::digest(format!("{nonce}:{wallet_id}:{amount}").as_bytes());
    format!("lwch_{}", hex::encode(&digest[..16]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_kind_display() {
        assert_eq!(TransactionKind::Deposit.to_string(), "deposit");
        assert_eq!(TransactionKind::Withdraw.to_string(), "withdraw");
    }

    #[test]
    fn test_ledger_hash_prefix_and_uniqueness() {
        let a = ledger_hash(1, 500);
        let b = ledger_hash(1, 500);
        assert!(a.starts_with("lwch_"));
        assert_ne!(a, b, "same wallet and amount must still hash uniquely");
    }
}
