//! Bet data models and the lifecycle state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bet model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bet {
    pub id: i64,
    pub user_id: i64,
    /// Provider-supplied transaction id, globally unique (idempotency key)
    pub transaction_id: String,
    /// Transaction id of the originating debit, on win/cancel legs
    pub ref_id: Option<String>,
    pub game_reference: String,
    /// Stake in minor units; zero on win legs
    pub amount: i64,
    pub win_amount: i64,
    pub status: BetStatus,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a new bet row
#[derive(Debug, Clone)]
pub struct NewBet {
    pub user_id: i64,
    pub transaction_id: String,
    pub ref_id: Option<String>,
    pub game_reference: String,
    pub amount: i64,
    pub win_amount: i64,
    pub status: BetStatus,
}

impl NewBet {
    /// An unsettled stake leg.
    pub fn stake(
        user_id: i64,
        transaction_id: String,
        ref_id: Option<String>,
        game_reference: String,
        amount: i64,
    ) -> Self {
        Self {
            user_id,
            transaction_id,
            ref_id,
            game_reference,
            amount,
            win_amount: 0,
            status: BetStatus::Unsettled,
        }
    }

    /// A win leg referencing its originating debit.
    pub fn win_leg(
        user_id: i64,
        transaction_id: String,
        ref_id: String,
        game_reference: String,
        win_amount: i64,
    ) -> Self {
        Self {
            user_id,
            transaction_id,
            ref_id: Some(ref_id),
            game_reference,
            amount: 0,
            win_amount,
            status: BetStatus::Won,
        }
    }
}

/// Bet lifecycle status.
///
/// `Unsettled` (stake debited) moves to `Won`, `Lost`, or `Refunded`;
/// `Won` may still be clawed back to `Refunded`; `Lost` and `Refunded`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    Unsettled,
    Won,
    Lost,
    Refunded,
}

impl BetStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, BetStatus::Lost | BetStatus::Refunded)
    }

    /// Whether the lifecycle permits moving from `self` to `next`.
    pub fn can_transition_to(self, next: BetStatus) -> bool {
        matches!(
            (self, next),
            (BetStatus::Unsettled, BetStatus::Won)
                | (BetStatus::Unsettled, BetStatus::Lost)
                | (BetStatus::Unsettled, BetStatus::Refunded)
                | (BetStatus::Won, BetStatus::Refunded)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BetStatus::Unsettled => "unsettled",
            BetStatus::Won => "won",
            BetStatus::Lost => "lost",
            BetStatus::Refunded => "refunded",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unsettled" => Some(BetStatus::Unsettled),
            "won" => Some(BetStatus::Won),
            "lost" => Some(BetStatus::Lost),
            "refunded" => Some(BetStatus::Refunded),
            _ => None,
        }
    }
}

impl std::fmt::Display for BetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            BetStatus::Unsettled,
            BetStatus::Won,
            BetStatus::Lost,
            BetStatus::Refunded,
        ] {
            assert_eq!(BetStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BetStatus::parse("settled"), None);
    }

    #[test]
    fn test_legal_transitions() {
        assert!(BetStatus::Unsettled.can_transition_to(BetStatus::Won));
        assert!(BetStatus::Unsettled.can_transition_to(BetStatus::Lost));
        assert!(BetStatus::Unsettled.can_transition_to(BetStatus::Refunded));
        assert!(BetStatus::Won.can_transition_to(BetStatus::Refunded));
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for next in [
            BetStatus::Unsettled,
            BetStatus::Won,
            BetStatus::Lost,
            BetStatus::Refunded,
        ] {
            assert!(!BetStatus::Lost.can_transition_to(next));
            assert!(!BetStatus::Refunded.can_transition_to(next));
        }
        assert!(!BetStatus::Won.can_transition_to(BetStatus::Won));
        assert!(!BetStatus::Won.can_transition_to(BetStatus::Lost));
        assert!(!BetStatus::Unsettled.can_transition_to(BetStatus::Unsettled));
    }
}
