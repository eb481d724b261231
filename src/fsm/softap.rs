//! SoftAP lifecycle.
//!
//! ```text
//!            start                 enable ok / ready latch
//!   Idle ─────────────▶ Starting ─────────────────────────▶ Active
//!    ▲                     │ bring-up failed / enable err      │
//!    │      stop           ▼                                   │
//!    ├──────────────────  Error ◀── (terminal for the attempt) │
//!    └─────────────────────────────────────────────── stop ────┘
//! ```
//!
//! Bring-up itself is I/O, so entering `Starting` yields
//! [`ApEffect::BeginBringUp`]; the owner performs it and reports a
//! synchronous failure back as [`ApInput::BringUpFailed`].  A successful
//! request is only confirmed later, by [`ApInput::EnableResult`] on the
//! push path or [`ApInput::Poll`] with the ready latch set.
//!
//! No input retries out of `Error`.  An explicit `StartRequested` there is
//! an external restart and begins a fresh attempt.

use super::Step;
use crate::messages::MacAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApState {
    Idle,
    Starting,
    Active,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApInput {
    StartRequested,
    StopRequested,
    /// Bring-up failed before the enable request was accepted.
    BringUpFailed(i32),
    /// Out-of-band confirmation from the network collaborator; 0 = success.
    EnableResult(i32),
    StationConnected(MacAddr),
    StationDisconnected(MacAddr),
    /// Coarse periodic run; `ready` is the latched enable-success flag.
    Poll { ready: bool },
}

/// Lifecycle notices the owner publishes on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApNotice {
    Started,
    Stopped,
    ClientConnected(MacAddr),
    ClientDisconnected(MacAddr),
    Error(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApEffect {
    /// Resolve the interface, configure regulatory domain and DHCP,
    /// request AP enable.
    BeginBringUp,
    /// Disable the AP, then announce `Stopped`.
    TearDown,
    Announce(ApNotice),
}

pub fn transition(state: ApState, input: ApInput) -> Step<ApState, ApEffect> {
    use ApInput as I;
    use ApState as S;

    match (state, input) {
        (S::Idle | S::Error, I::StartRequested) => Step::enter(S::Starting, ApEffect::BeginBringUp),

        (S::Starting, I::EnableResult(0) | I::Poll { ready: true }) => {
            Step::enter(S::Active, ApEffect::Announce(ApNotice::Started))
        }
        (S::Starting, I::EnableResult(code) | I::BringUpFailed(code)) => {
            Step::enter(S::Error, ApEffect::Announce(ApNotice::Error(code)))
        }

        (S::Active, I::StationConnected(mac)) => {
            Step::enter(S::Active, ApEffect::Announce(ApNotice::ClientConnected(mac)))
        }
        (S::Active, I::StationDisconnected(mac)) => {
            Step::enter(S::Active, ApEffect::Announce(ApNotice::ClientDisconnected(mac)))
        }

        (S::Starting | S::Active, I::StopRequested) => Step::enter(S::Idle, ApEffect::TearDown),

        (s, _) => Step::stay(s),
    }
}
