//! Message shapes carried on the bus.
//!
//! One type per channel.  Messages are plain owned values; the bus lends
//! each listener a reference to the publisher's value for the duration of
//! one publish call, and a listener that needs it later copies it out.
//!
//! ```text
//!   ButtonMsg   ── button channel    ── Button SM  ─▶ LED/gateway/log
//!   LedCmdMsg   ── led_cmd channel   ── gateway    ─▶ LED SM
//!   LedStateMsg ── led_state channel ── LED SM     ─▶ gateway/log
//!   ApMsg       ── ap channel        ── SoftAP SM  ─▶ gateway/log
//! ```

use core::fmt;
use core::str::FromStr;

use crate::board::{ButtonIndex, LedIndex};
use crate::error::RequestError;

/// 802.11 station hardware address.
pub type MacAddr = [u8; 6];

/// Network name as carried in lifecycle messages.
pub type Ssid = heapless::String<32>;

// ── Button channel ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonMsg {
    pub action: ButtonAction,
    pub button: ButtonIndex,
    /// Cumulative presses for this button, including this one if `Pressed`.
    pub press_count: u32,
    pub timestamp_ms: u32,
}

// ── LED channels ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedAction {
    On,
    Off,
    Toggle,
}

impl FromStr for LedAction {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            "toggle" => Ok(Self::Toggle),
            _ => Err(RequestError::UnknownAction),
        }
    }
}

impl fmt::Display for LedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Toggle => "toggle",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedCmdMsg {
    pub action: LedAction,
    pub led: LedIndex,
}

/// Result of a completed LED transition.  Never published speculatively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedStateMsg {
    pub led: LedIndex,
    pub on: bool,
}

// ── SoftAP lifecycle channel ──────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApEventKind {
    Started,
    Stopped,
    ClientConnected(MacAddr),
    ClientDisconnected(MacAddr),
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApMsg {
    pub kind: ApEventKind,
    pub ssid: Ssid,
    pub channel: u8,
    /// Collaborator error code; zero unless `kind` is `Error`.
    pub error_code: i32,
}

/// Display adapter rendering a MAC as `aa:bb:cc:dd:ee:ff`.
pub struct Mac<'a>(pub &'a MacAddr);

impl fmt::Display for Mac<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = *self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}
