//! Button press detection.
//!
//! ```text
//!        rising            falling
//!   Idle ──────▶ Pressed ─────────▶ Released ──(auto)──▶ Idle
//! ```
//!
//! `Released` is transient: the owner publishes the release and the
//! machine settles back to `Idle` within the same `feed` call.  Edges are
//! assumed clean; debouncing belongs to the input driver.

use super::Step;
use crate::messages::ButtonAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Idle,
    Pressed,
    Released,
}

/// Level change between two consecutive samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
    Steady,
}

pub const fn edge(previous: bool, current: bool) -> Edge {
    match (previous, current) {
        (false, true) => Edge::Rising,
        (true, false) => Edge::Falling,
        _ => Edge::Steady,
    }
}

pub fn transition(state: ButtonState, edge: Edge) -> Step<ButtonState, ButtonAction> {
    match (state, edge) {
        (ButtonState::Idle, Edge::Rising) => Step::enter(ButtonState::Pressed, ButtonAction::Pressed),
        (ButtonState::Pressed, Edge::Falling) => {
            Step::enter(ButtonState::Released, ButtonAction::Released)
        }
        (ButtonState::Released, _) => Step::stay(ButtonState::Idle),
        (s, _) => Step::stay(s),
    }
}

/// One button's machine plus its instance-local counters.
#[derive(Debug, Clone)]
pub struct ButtonMachine {
    state: ButtonState,
    press_count: u32,
    level: bool,
}

impl Default for ButtonMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonMachine {
    pub const fn new() -> Self {
        Self {
            state: ButtonState::Idle,
            press_count: 0,
            level: false,
        }
    }

    /// Feed the latest level for this button.  Returns the action to
    /// publish, if the sample completed a transition.
    pub fn feed(&mut self, level: bool) -> Option<ButtonAction> {
        let step = transition(self.state, edge(self.level, level));
        self.level = level;
        self.state = step.next;
        match step.effect {
            Some(ButtonAction::Pressed) => {
                self.press_count = self.press_count.saturating_add(1);
            }
            Some(ButtonAction::Released) => {
                // Transient state: settle immediately.
                self.state = transition(self.state, Edge::Steady).next;
            }
            None => {}
        }
        step.effect
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    pub fn press_count(&self) -> u32 {
        self.press_count
    }

    pub fn level(&self) -> bool {
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_detection() {
        assert_eq!(edge(false, true), Edge::Rising);
        assert_eq!(edge(true, false), Edge::Falling);
        assert_eq!(edge(true, true), Edge::Steady);
        assert_eq!(edge(false, false), Edge::Steady);
    }

    #[test]
    fn idle_ignores_falling_edge() {
        assert_eq!(transition(ButtonState::Idle, Edge::Falling), Step::stay(ButtonState::Idle));
    }

    #[test]
    fn pressed_ignores_second_rising_edge() {
        assert_eq!(
            transition(ButtonState::Pressed, Edge::Rising),
            Step::stay(ButtonState::Pressed)
        );
    }

    #[test]
    fn press_release_cycle() {
        let mut m = ButtonMachine::new();
        assert_eq!(m.feed(true), Some(ButtonAction::Pressed));
        assert_eq!(m.state(), ButtonState::Pressed);
        assert_eq!(m.press_count(), 1);

        assert_eq!(m.feed(false), Some(ButtonAction::Released));
        assert_eq!(m.state(), ButtonState::Idle);
        assert_eq!(m.press_count(), 1);
    }

    #[test]
    fn repeated_level_is_not_an_edge() {
        let mut m = ButtonMachine::new();
        m.feed(true);
        assert_eq!(m.feed(true), None);
        assert_eq!(m.press_count(), 1);
    }

    #[test]
    fn count_increments_once_per_press() {
        let mut m = ButtonMachine::new();
        for _ in 0..5 {
            m.feed(true);
            m.feed(false);
        }
        assert_eq!(m.press_count(), 5);
    }
}
