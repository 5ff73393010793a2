//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::catalog::tests::destination;
use crate::catalog::{Category, CategoryFilter, Destination};
use crate::itinerary::{Itinerary, ItineraryDay};
use crate::transcript::{NewMessage, Role};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

const NAMES: [&str; 3] = ["Kyoto", "Petra", "Banff"];

fn arb_category() -> impl Strategy<Value = Category> {
    prop::sample::select(Category::ALL.to_vec())
}

fn arb_filter() -> impl Strategy<Value = CategoryFilter> {
    prop_oneof![
        Just(CategoryFilter::All),
        arb_category().prop_map(CategoryFilter::Only),
    ]
}

fn arb_name() -> impl Strategy<Value = String> {
    prop::sample::select(NAMES.to_vec()).prop_map(String::from)
}

fn arb_destination() -> impl Strategy<Value = Destination> {
    (arb_name(), arb_category())
        .prop_map(|(name, category)| destination(&name.to_lowercase(), &name, category))
}

fn arb_itinerary() -> impl Strategy<Value = Itinerary> {
    (arb_name(), 1usize..4).prop_map(|(destination, days)| Itinerary {
        destination,
        days: (1..=days)
            .map(|d| ItineraryDay {
                day: u32::try_from(d).unwrap(),
                title: format!("Day {d}"),
                activities: vec!["Walk".to_string()],
            })
            .collect(),
    })
}

fn arb_pending() -> impl Strategy<Value = Pending> {
    prop_oneof![
        Just(Pending::Idle),
        Just(Pending::Chat),
        arb_name().prop_map(|destination| Pending::Itinerary { destination }),
    ]
}

fn arb_state() -> impl Strategy<Value = SessionState> {
    (
        arb_pending(),
        proptest::option::of(arb_destination()),
        arb_filter(),
    )
        .prop_map(|(pending, selected, filter)| SessionState {
            pending,
            selected,
            itinerary: None,
            filter,
        })
}

fn arb_busy_state() -> impl Strategy<Value = SessionState> {
    arb_state().prop_filter("must be pending", SessionState::is_pending)
}

fn arb_blank_text() -> impl Strategy<Value = String> {
    "[ \t\n]{0,8}"
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-zA-Z ]{0,20}".prop_map(|text| Event::SubmitMessage { text }),
        arb_destination().prop_map(|destination| Event::SelectDestination { destination }),
        Just(Event::RequestItinerary),
        arb_filter().prop_map(|filter| Event::SetCategoryFilter { filter }),
        Just(Event::DismissItinerary),
        Just(Event::DismissSelection),
        "[a-zA-Z ]{1,20}".prop_map(|text| Event::GuideReplied { text }),
        (arb_name(), proptest::option::of(arb_itinerary())).prop_map(
            |(destination, itinerary)| Event::ItineraryGenerated {
                destination,
                itinerary
            }
        ),
    ]
}

fn appended(effects: &[Effect]) -> Vec<&NewMessage> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::AppendMessage(m) => Some(m),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_blank_submissions_always_rejected(state in arb_state(), text in arb_blank_text()) {
        let result = transition(&state, Event::SubmitMessage { text });
        prop_assert_eq!(result.unwrap_err(), TransitionError::EmptyMessage);
    }

    #[test]
    fn prop_busy_rejects_new_remote_work(state in arb_busy_state(), text in "[a-z]{1,10}") {
        prop_assert_eq!(
            transition(&state, Event::SubmitMessage { text }).unwrap_err(),
            TransitionError::Busy
        );
        let result = transition(&state, Event::RequestItinerary);
        prop_assert!(result.is_err());
    }

    #[test]
    fn prop_idle_submit_appends_user_text_then_requests(text in "[a-zA-Z]{1}[a-zA-Z ]{0,20}") {
        let result = transition(&SessionState::default(), Event::SubmitMessage { text: text.clone() }).unwrap();

        let messages = appended(&result.effects);
        prop_assert_eq!(messages.len(), 1);
        prop_assert_eq!(messages[0].role, Role::User);
        prop_assert_eq!(&messages[0].content, &text);
        prop_assert_eq!(result.new_state.pending, Pending::Chat);

        let append_at = result.effects.iter().position(|e| matches!(e, Effect::AppendMessage(_)));
        let request_at = result.effects.iter().position(Effect::is_remote_call);
        prop_assert!(append_at < request_at);
    }

    #[test]
    fn prop_select_always_clears_itinerary(
        mut state in arb_state(),
        itinerary in proptest::option::of(arb_itinerary()),
        dest in arb_destination(),
    ) {
        state.itinerary = itinerary;
        let result = transition(&state, Event::SelectDestination { destination: dest.clone() }).unwrap();
        prop_assert!(result.new_state.itinerary.is_none());
        prop_assert_eq!(result.new_state.selected, Some(dest));
        prop_assert_eq!(&result.new_state.pending, &state.pending);
        prop_assert_eq!(appended(&result.effects).len(), 1);
    }

    #[test]
    fn prop_filter_changes_nothing_else(state in arb_state(), filter in arb_filter()) {
        let result = transition(&state, Event::SetCategoryFilter { filter }).unwrap();
        prop_assert_eq!(result.new_state.filter, filter);
        prop_assert_eq!(&result.new_state.pending, &state.pending);
        prop_assert_eq!(&result.new_state.selected, &state.selected);
        prop_assert!(appended(&result.effects).is_empty());
    }

    /// Fold random event sequences and check invariants after every step
    #[test]
    fn prop_sequence_invariants(events in proptest::collection::vec(arb_event(), 1..40)) {
        let mut state = SessionState::default();

        for event in events {
            let was_pending = state.is_pending();
            let Ok(result) = transition(&state, event) else {
                continue;
            };

            let remote_calls = result.effects.iter().filter(|e| e.is_remote_call()).count();
            prop_assert!(remote_calls <= 1);
            if remote_calls == 1 {
                // A call is only ever issued from idle, and leaves us pending
                prop_assert!(!was_pending);
                prop_assert!(result.new_state.is_pending());
            }

            if result.new_state.itinerary.is_some() {
                prop_assert!(result.new_state.selected.is_some());
            }

            state = result.new_state;
        }
    }
}
