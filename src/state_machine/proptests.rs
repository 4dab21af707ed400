//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::transition::TransitionError;
use super::*;
use crate::llm::LlmErrorKind;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

/// Text with at least one visible character, possibly padded with whitespace
fn arb_answer() -> impl Strategy<Value = String> {
    ("[ \t]{0,3}", "[a-zA-Z0-9][a-zA-Z0-9 /.-]{0,20}", "[ \t\n]{0,3}")
        .prop_map(|(pre, body, post)| format!("{pre}{body}{post}"))
}

fn arb_blank() -> impl Strategy<Value = String> {
    "[ \t\n\r]{0,6}"
}

fn arb_error_kind() -> impl Strategy<Value = LlmErrorKind> {
    prop_oneof![
        Just(LlmErrorKind::Network),
        Just(LlmErrorKind::QuotaExceeded),
        Just(LlmErrorKind::ServerError),
        Just(LlmErrorKind::Auth),
        Just(LlmErrorKind::InvalidRequest),
        Just(LlmErrorKind::Malformed),
        Just(LlmErrorKind::Unknown),
    ]
}

fn arb_stage() -> impl Strategy<Value = Stage> {
    prop_oneof![
        Just(Stage::AwaitingName),
        "[a-zA-Z ]{1,12}".prop_map(|name| Stage::AwaitingDob { name }),
        ("[a-zA-Z ]{1,12}", "[0-9-]{1,10}").prop_map(|(name, date_of_birth)| Stage::Ready {
            name,
            date_of_birth
        }),
    ]
}

/// Reachable states: only a ready session can be waiting on a reply
fn arb_state() -> impl Strategy<Value = ConversationState> {
    (arb_stage(), any::<bool>()).prop_map(|(stage, busy)| {
        let busy = busy && stage.is_ready();
        ConversationState { stage, busy }
    })
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_answer().prop_map(|text| Event::UserInput { text }),
        arb_blank().prop_map(|text| Event::UserInput { text }),
        "[a-zA-Z ]{0,20}".prop_map(|text| Event::ReplyReceived { text }),
        arb_error_kind().prop_map(|kind| Event::ReplyFailed { kind }),
    ]
}

fn ready(name: &str, date_of_birth: &str) -> ConversationState {
    ConversationState {
        stage: Stage::Ready {
            name: name.to_string(),
            date_of_birth: date_of_birth.to_string(),
        },
        busy: false,
    }
}

fn requests_reply(effects: &[Effect]) -> bool {
    effects
        .iter()
        .any(|e| matches!(e, Effect::RequestReply { .. }))
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // A name answer advances to AwaitingDob without a collaborator call
    #[test]
    fn prop_name_answer_advances(text in arb_answer()) {
        let result = transition(&ConversationState::new(), Event::UserInput { text: text.clone() }).unwrap();

        prop_assert_eq!(
            &result.new_state.stage,
            &Stage::AwaitingDob { name: text.trim().to_string() }
        );
        prop_assert_eq!(
            result.new_state.profile().map(|p| p.name),
            Some(text.trim().to_string())
        );
        prop_assert!(!requests_reply(&result.effects));
        prop_assert!(!result.new_state.busy);
    }

    // A date-of-birth answer reaches Ready without a collaborator call
    #[test]
    fn prop_dob_answer_reaches_ready(name in "[a-zA-Z]{1,10}", text in arb_answer()) {
        let state = ConversationState {
            stage: Stage::AwaitingDob { name: name.clone() },
            busy: false,
        };
        let result = transition(&state, Event::UserInput { text: text.clone() }).unwrap();

        prop_assert!(result.new_state.stage.is_ready());
        let profile = result.new_state.profile().unwrap();
        prop_assert_eq!(profile.name, name);
        prop_assert_eq!(profile.date_of_birth, Some(text.trim().to_string()));
        prop_assert!(!requests_reply(&result.effects));
    }

    // Blank input is rejected with no state change and no effects
    #[test]
    fn prop_blank_input_rejected(state in arb_state(), text in arb_blank()) {
        let result = transition(&state, Event::UserInput { text });
        prop_assert_eq!(result.unwrap_err(), TransitionError::EmptyInput);
    }

    // Ready is terminal: every accepted event leaves the session Ready
    #[test]
    fn prop_ready_is_terminal(
        name in "[a-zA-Z]{1,10}",
        dob in "[0-9-]{1,10}",
        events in proptest::collection::vec(arb_event(), 1..12)
    ) {
        let mut state = ready(&name, &dob);
        for event in events {
            if let Ok(result) = transition(&state, event) {
                state = result.new_state;
            }
            prop_assert!(state.stage.is_ready());
            prop_assert_eq!(state.profile().and_then(|p| p.date_of_birth), Some(dob.clone()));
        }
    }

    // Stage never moves backwards, whatever happens
    #[test]
    fn prop_stage_monotonic(state in arb_state(), event in arb_event()) {
        if let Ok(result) = transition(&state, event) {
            prop_assert!(result.new_state.stage.rank() >= state.stage.rank());
            prop_assert!(result.new_state.stage.rank() <= state.stage.rank() + 1);
        }
    }

    // Rejected events never produce effects, accepted user input is always recorded first
    #[test]
    fn prop_user_input_recorded_first(state in arb_state(), text in arb_answer()) {
        match transition(&state, Event::UserInput { text: text.clone() }) {
            Ok(result) => {
                prop_assert_eq!(&result.effects[0], &Effect::user_said(text));
            }
            Err(e) => {
                prop_assert!(state.busy);
                prop_assert_eq!(e, TransitionError::Busy);
            }
        }
    }

    // Only the Ready stage talks to the collaborator, and only Ready can be busy
    #[test]
    fn prop_busy_only_when_ready(state in arb_state(), event in arb_event()) {
        if let Ok(result) = transition(&state, event) {
            if result.new_state.busy {
                prop_assert!(result.new_state.stage.is_ready());
            }
            prop_assert_eq!(requests_reply(&result.effects), result.new_state.busy && !state.busy);
        }
    }

    // A failed reply clears busy and appends exactly one assistant message
    #[test]
    fn prop_failure_clears_busy(kind in arb_error_kind()) {
        let mut state = ready("Sita", "2050-01-01");
        state.busy = true;
        let result = transition(&state, Event::ReplyFailed { kind }).unwrap();

        prop_assert!(!result.new_state.busy);
        prop_assert!(result.new_state.stage.is_ready());
        prop_assert_eq!(result.effects.len(), 1);
        let is_assistant_entry = matches!(
            &result.effects[0],
            Effect::AppendTranscript { speaker: Speaker::Assistant, .. }
        );
        prop_assert!(is_assistant_entry);
    }
}
