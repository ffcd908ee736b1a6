//! Wallet module providing the ledger store: durable per-user balances plus
//! an append-only transaction log.
//!
//! Balances are integer minor units. The store itself does not enforce
//! non-negativity; callers (the settlement engine, operator tooling) decide
//! policy. Every balance adjustment appends exactly one immutable
//! `wallet_transactions` row carrying a freshly generated hash.

pub mod errors;
pub mod models;
pub mod store;

pub use errors::{WalletError, WalletResult};
pub use models::{LedgerDescriptor, LedgerEntry, TransactionKind, Wallet};
