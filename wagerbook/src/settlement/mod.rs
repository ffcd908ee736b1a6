//! Settlement engine: the single write path for player balances.
//!
//! This module implements:
//! - The bet lifecycle per provider callback: debit (stake), credit (win
//!   settlement), abort (cancel/refund)
//! - Idempotency keyed by the provider-supplied transaction id, with
//!   deterministic replay answers
//! - One atomic SQL transaction per operation: registry lookup + registry
//!   write + balance adjustment, all-or-nothing, under an exclusive wallet
//!   row lock
//! - Operator fund movement between wallets (manager/administrator)
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wagerbook::db::Database;
//! use wagerbook::settlement::{Caller, CreditRequest, PlayerIdentity, SettlementEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let engine = SettlementEngine::new(Arc::new(db.pool().clone()));
//!
//!     let caller = Caller::player(PlayerIdentity::new(42));
//!     let outcome = engine
//!         .credit(
//!             &caller,
//!             &CreditRequest {
//!                 transaction_id: "prov-tx-2002".into(),
//!                 ref_id: "prov-tx-2001".into(),
//!                 game_reference: "roulette/eu-1".into(),
//!                 amount: 950,
//!             },
//!         )
//!         .await?;
//!     println!("balance after win: {}", outcome.balance);
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod errors;
pub mod models;

pub use engine::SettlementEngine;
pub use errors::{SettlementError, SettlementResult};
pub use models::{
    AbortRequest, Caller, CallerRole, CreditRequest, DebitRequest, PlayerIdentity,
    SettlementOutcome, SettlementResponse, TransferRequest,
};
