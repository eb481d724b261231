//! LED command execution.
//!
//! Two states, `Off` and `On`.  A machine holds at most one pending
//! command; a newer command replaces an unconsumed one.  `Toggle` is
//! resolved against the state at the moment the command is consumed.

use super::Step;
use crate::messages::LedAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedState {
    Off,
    On,
}

impl LedState {
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    const fn from_bool(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

/// Entry action for `On` / `Off`: drive the output to this level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drive(pub bool);

pub fn transition(state: LedState, action: LedAction) -> Step<LedState, Drive> {
    let target = match action {
        LedAction::On => LedState::On,
        LedAction::Off => LedState::Off,
        LedAction::Toggle => LedState::from_bool(!state.is_on()),
    };
    if target == state {
        Step::stay(state)
    } else {
        Step::enter(target, Drive(target.is_on()))
    }
}

#[derive(Debug, Clone)]
pub struct LedMachine {
    state: LedState,
    pending: Option<LedAction>,
}

impl Default for LedMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl LedMachine {
    pub const fn new() -> Self {
        Self {
            state: LedState::Off,
            pending: None,
        }
    }

    /// Initial entry into `Off`.  The owner drives the output with the
    /// returned level so hardware agrees with logical state from boot.
    pub fn start(&mut self) -> Drive {
        self.state = LedState::Off;
        self.pending = None;
        Drive(false)
    }

    /// Buffer a command.  Returns `true` when it replaced an unconsumed one.
    pub fn submit(&mut self, action: LedAction) -> bool {
        self.pending.replace(action).is_some()
    }

    /// Consume the pending command, if any.  Returns the level to drive when
    /// the command changed state; a self-loop (e.g. `On` while on) returns `None`.
    pub fn run(&mut self) -> Option<bool> {
        let action = self.pending.take()?;
        let step = transition(self.state, action);
        self.state = step.next;
        step.effect.map(|Drive(on)| on)
    }

    pub fn state(&self) -> LedState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state.is_on()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}
