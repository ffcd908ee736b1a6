//! Property-based tests for the bet lifecycle state machine.

use proptest::prelude::*;
use wagerbook::bets::BetStatus;

fn status_strategy() -> impl Strategy<Value = BetStatus> {
    prop_oneof![
        Just(BetStatus::Unsettled),
        Just(BetStatus::Won),
        Just(BetStatus::Lost),
        Just(BetStatus::Refunded),
    ]
}

proptest! {
    /// The transition matrix admits exactly the five legal moves and
    /// nothing else.
    #[test]
    fn transition_matrix_is_exactly_the_allowed_set(
        from in status_strategy(),
        to in status_strategy(),
    ) {
        let allowed = matches!(
            (from, to),
            (BetStatus::Unsettled, BetStatus::Won)
                | (BetStatus::Unsettled, BetStatus::Lost)
                | (BetStatus::Unsettled, BetStatus::Refunded)
                | (BetStatus::Won, BetStatus::Refunded)
        );
        prop_assert_eq!(from.can_transition_to(to), allowed);
    }

    /// Terminal states never admit any transition, including self-loops.
    #[test]
    fn terminal_states_admit_no_transition(
        from in status_strategy(),
        to in status_strategy(),
    ) {
        if from.is_terminal() {
            prop_assert!(!from.can_transition_to(to));
        }
    }

    /// Status text stored in the database round-trips through parse.
    #[test]
    fn status_text_round_trips(status in status_strategy()) {
        prop_assert_eq!(BetStatus::parse(status.as_str()), Some(status));
    }
}
