//! Pure state machines.
//!
//! Each machine is a tagged enum plus a `transition(state, input) -> Step`
//! function.  Decisions live here; side effects (driving a pin, talking to
//! the radio, publishing on the bus) are returned as data and executed by
//! the owning module in [`crate::app`].
//!
//! ```text
//!   input ──▶ transition(state, input) ──▶ Step { next, effect }
//!                                             │        │
//!                                       stored by    executed by
//!                                       the owner    the owner
//! ```
//!
//! Nothing here allocates, locks, or logs, so every machine can be driven
//! exhaustively from property tests.

pub mod button;
pub mod led;
pub mod softap;

/// Outcome of one transition: the next state and at most one effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step<S, E> {
    pub next: S,
    pub effect: Option<E>,
}

impl<S, E> Step<S, E> {
    /// No state change, nothing to do.
    pub const fn stay(state: S) -> Self {
        Self {
            next: state,
            effect: None,
        }
    }

    /// Move to `next` and run its entry effect.
    pub const fn enter(next: S, effect: E) -> Self {
        Self {
            next,
            effect: Some(effect),
        }
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod proptests {
    use super::button::{ButtonMachine, ButtonState};
    use super::led::{LedMachine, LedState};
    use super::softap::{ApEffect, ApInput, ApNotice, ApState, transition};
    use crate::messages::{ButtonAction, LedAction};
    use proptest::prelude::*;

    fn arb_led_action() -> impl Strategy<Value = LedAction> {
        prop_oneof![
            Just(LedAction::On),
            Just(LedAction::Off),
            Just(LedAction::Toggle),
        ]
    }

    fn arb_ap_input() -> impl Strategy<Value = ApInput> {
        let mac = any::<[u8; 6]>();
        prop_oneof![
            Just(ApInput::StartRequested),
            Just(ApInput::StopRequested),
            (-20i32..20).prop_map(ApInput::BringUpFailed),
            (-3i32..6).prop_map(ApInput::EnableResult),
            mac.prop_map(ApInput::StationConnected),
            any::<[u8; 6]>().prop_map(ApInput::StationDisconnected),
            any::<bool>().prop_map(|ready| ApInput::Poll { ready }),
        ]
    }

    proptest! {
        /// Pressed count equals the number of Pressed events, and every
        /// Released is preceded by an unmatched Pressed.
        #[test]
        fn button_presses_pair_with_releases(levels in proptest::collection::vec(any::<bool>(), 0..200)) {
            let mut m = ButtonMachine::new();
            let mut pressed = 0u32;
            let mut open = false;
            for level in levels {
                match m.feed(level) {
                    Some(ButtonAction::Pressed) => {
                        prop_assert!(!open);
                        pressed += 1;
                        open = true;
                        prop_assert_eq!(m.press_count(), pressed);
                    }
                    Some(ButtonAction::Released) => {
                        prop_assert!(open);
                        open = false;
                    }
                    None => {}
                }
                prop_assert_ne!(m.state(), ButtonState::Released);
            }
            prop_assert_eq!(m.press_count(), pressed);
        }

        /// Toggle always drives the negation of the state it was applied to.
        #[test]
        fn led_toggle_negates(actions in proptest::collection::vec(arb_led_action(), 0..50)) {
            let mut m = LedMachine::new();
            m.start();
            for action in actions {
                let before = m.is_on();
                m.submit(action);
                let driven = m.run();
                match action {
                    LedAction::Toggle => prop_assert_eq!(driven, Some(!before)),
                    LedAction::On => prop_assert_eq!(m.state(), LedState::On),
                    LedAction::Off => prop_assert_eq!(m.state(), LedState::Off),
                }
                prop_assert_eq!(m.run(), None, "a consumed command must not replay");
            }
        }

        /// Started and Error appear at most once between StartRequested
        /// inputs, client notices only while Active, and Started only after
        /// a successful confirmation.
        #[test]
        fn softap_attempt_invariants(inputs in proptest::collection::vec(arb_ap_input(), 0..100)) {
            let mut state = ApState::Idle;
            let mut started = 0;
            let mut errors = 0;
            for input in inputs {
                let was = state;
                let step = transition(state, input);
                if let Some(ApEffect::BeginBringUp) = step.effect {
                    started = 0;
                    errors = 0;
                }
                if let Some(ApEffect::Announce(notice)) = step.effect {
                    match notice {
                        ApNotice::Started => {
                            started += 1;
                            prop_assert_eq!(was, ApState::Starting);
                            let confirmed =
                                matches!(input, ApInput::EnableResult(0) | ApInput::Poll { ready: true });
                            prop_assert!(confirmed);
                        }
                        ApNotice::Error(_) => errors += 1,
                        ApNotice::ClientConnected(_) | ApNotice::ClientDisconnected(_) => {
                            prop_assert_eq!(was, ApState::Active);
                        }
                        ApNotice::Stopped => {}
                    }
                }
                prop_assert!(started <= 1);
                prop_assert!(errors <= 1);
                state = step.next;
            }
        }
    }
}
