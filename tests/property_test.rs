use donation_ledger::domain::donation::{DonationStatus, TerminalStatus};
use donation_ledger::domain::money::MoneyAmount;
use proptest::prelude::*;

fn arb_status() -> impl Strategy<Value = DonationStatus> {
    prop_oneof![
        Just(DonationStatus::Pending),
        Just(DonationStatus::Success),
        Just(DonationStatus::Failed),
        Just(DonationStatus::Cancelled),
    ]
}

proptest! {
    /// Terminal states never transition, not even to themselves.
    #[test]
    fn terminal_states_reject_all_transitions(target in arb_status()) {
        use DonationStatus::*;
        for terminal in [Success, Failed, Cancelled] {
            prop_assert!(!terminal.can_transition_to(&target));
        }
    }

    /// Any random sequence of attempted transitions starting from Pending
    /// performs at most one — every reachable target is terminal.
    #[test]
    fn random_walk_has_at_most_one_transition(
        steps in prop::collection::vec(arb_status(), 1..20)
    ) {
        let mut current = DonationStatus::Pending;
        let mut transitions = 0u32;
        for next in &steps {
            if current.can_transition_to(next) {
                current = *next;
                transitions += 1;
            }
        }
        prop_assert!(transitions <= 1, "got {transitions} transitions in walk: {steps:?}");
        prop_assert!(transitions == 0 || current.is_terminal());
    }

    /// as_str → try_from roundtrip is identity for any status.
    #[test]
    fn status_roundtrip(status in arb_status()) {
        let roundtripped = DonationStatus::try_from(status.as_str()).unwrap();
        prop_assert_eq!(roundtripped, status);
    }

    /// The gateway mapping is total and never yields PENDING: every input
    /// string either maps to a terminal value or to "nothing definitive".
    #[test]
    fn gateway_mapping_is_total_and_terminal(observed in "\\PC*") {
        match TerminalStatus::from_gateway(&observed) {
            Some(status) => prop_assert!(status.as_status().is_terminal()),
            None => prop_assert!(
                matches!(observed.as_str(), "pending" | "ongoing" | "queued" | "processing")
            ),
        }
    }

    /// Only "success" ever maps to SUCCESS.
    #[test]
    fn only_success_maps_to_success(observed in "\\PC*") {
        if TerminalStatus::from_gateway(&observed) == Some(TerminalStatus::Success) {
            prop_assert_eq!(observed.as_str(), "success");
        }
    }

    /// Positive amounts roundtrip; zero and negatives are rejected.
    #[test]
    fn money_amount_positivity(units in i64::MIN..=i64::MAX) {
        match MoneyAmount::new(units) {
            Ok(amount) => {
                prop_assert!(units > 0);
                prop_assert_eq!(amount.minor_units(), units);
            }
            Err(_) => prop_assert!(units <= 0),
        }
    }
}
