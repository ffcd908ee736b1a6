//! Bet registry: one row per wagering event, keyed by the provider-supplied
//! transaction id, with the bet lifecycle state machine.
//!
//! The transaction id is the idempotency key. Duplicate detection is
//! race-safe: it rides the storage-layer unique constraint, never a
//! read-then-write check.

pub mod errors;
pub mod models;
pub mod registry;

pub use errors::{BetError, BetResult};
pub use models::{Bet, BetStatus, NewBet};
