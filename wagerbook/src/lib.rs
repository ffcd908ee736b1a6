//! # Wagerbook
//!
//! A wallet ledger and game-bet settlement core for casino operator platforms.
//!
//! Wagerbook reconciles a player's monetary balance against a stream of
//! externally-triggered gambling events (place bet, settle win, refund/cancel)
//! arriving from third-party game providers via callback-style requests. All
//! amounts are integer minor units (cents); every mutating call is keyed by a
//! provider-supplied transaction id so retried callbacks are absorbed without
//! double effect.
//!
//! ## Architecture
//!
//! - [`db`]: PostgreSQL connection pooling and schema bootstrap
//! - [`wallet`]: durable per-user balance plus append-only transaction log
//! - [`bets`]: one row per wagering event, keyed by provider transaction id,
//!   with the bet lifecycle state machine
//! - [`settlement`]: debit/credit/abort operations, each one atomic SQL
//!   transaction spanning the wallet and the bet registry
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wagerbook::db::{Database, DatabaseConfig};
//! use wagerbook::settlement::{Caller, DebitRequest, PlayerIdentity, SettlementEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&DatabaseConfig::from_env()).await?;
//!     let engine = SettlementEngine::new(Arc::new(db.pool().clone()));
//!
//!     let caller = Caller::player(PlayerIdentity::new(1));
//!     let outcome = engine
//!         .debit(
//!             &caller,
//!             &DebitRequest {
//!                 transaction_id: "prov-tx-1001".into(),
//!                 ref_id: None,
//!                 game_reference: "slots/starburst".into(),
//!                 amount: 200,
//!             },
//!         )
//!         .await?;
//!     println!("balance after stake: {}", outcome.balance);
//!     Ok(())
//! }
//! ```

pub mod bets;
pub mod db;
pub mod settlement;
pub mod wallet;

pub use bets::{Bet, BetStatus};
pub use settlement::{
    Caller, CallerRole, PlayerIdentity, SettlementEngine, SettlementError, SettlementOutcome,
    SettlementResponse, SettlementResult,
};
pub use wallet::{LedgerEntry, TransactionKind, Wallet};
