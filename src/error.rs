//! Unified error types for the control panel.
//!
//! A single `Error` enum that every subsystem can convert into, so the
//! composition root and the HTTP gateway handle failures uniformly.
//! All variants are `Copy`: they travel through bus listeners and state
//! machine effects without allocation.
//!
//! State machines never return these; they model failure as a state
//! (`ApState::Error`) or a published lifecycle message.  Errors surface
//! only at the edges: bus publish, command intake, network collaborator.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A bus publish or subscribe failed.
    Bus(BusError),
    /// An index did not refer to a configured button or LED.
    Index(IndexError),
    /// The network collaborator reported a failure.
    Network(NetError),
    /// An external command payload was rejected.
    Request(RequestError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus: {e}"),
            Self::Index(e) => write!(f, "index: {e}"),
            Self::Network(e) => write!(f, "network: {e}"),
            Self::Request(e) => write!(f, "request: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Bus errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// The channel guard was not acquired within the caller's timeout.
    Busy,
    /// No listener is registered on the channel yet.
    Unavailable,
    /// The channel's fixed listener table is full.
    ListenersFull,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "channel busy"),
            Self::Unavailable => write!(f, "no listeners"),
            Self::ListenersFull => write!(f, "listener table full"),
        }
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

// ---------------------------------------------------------------------------
// Index errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    Button(u8),
    Led(u8),
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Button(i) => write!(f, "no button at index {i}"),
            Self::Led(i) => write!(f, "no LED at index {i}"),
        }
    }
}

impl From<IndexError> for Error {
    fn from(e: IndexError) -> Self {
        Self::Index(e)
    }
}

// ---------------------------------------------------------------------------
// Network collaborator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetError {
    /// The wireless interface could not be resolved.
    NoDevice,
    /// The requested service is already running.
    AlreadyRunning,
    /// A bounded wait expired before the awaited event.
    Timeout,
    /// Driver-specific failure code.
    Failed(i32),
}

impl NetError {
    /// Negative errno-style code carried in lifecycle `Error` messages.
    pub const fn code(self) -> i32 {
        match self {
            Self::NoDevice => -19,
            Self::AlreadyRunning => -114,
            Self::Timeout => -110,
            Self::Failed(code) => code,
        }
    }
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDevice => write!(f, "no wireless device"),
            Self::AlreadyRunning => write!(f, "already running"),
            Self::Timeout => write!(f, "timed out"),
            Self::Failed(code) => write!(f, "driver error {code}"),
        }
    }
}

impl From<NetError> for Error {
    fn from(e: NetError) -> Self {
        Self::Network(e)
    }
}

// ---------------------------------------------------------------------------
// Command intake errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    /// No body was supplied.
    Empty,
    /// The body was not a valid command document.
    Malformed,
    /// `action` was not one of `on`, `off`, `toggle`.
    UnknownAction,
    /// `led` does not name a configured LED.
    LedOutOfRange(u8),
    /// The command channel could not be acquired in time.
    Busy,
}

impl RequestError {
    /// HTTP status reported to the client.
    pub const fn status(self) -> u16 {
        match self {
            Self::Busy => 500,
            _ => 400,
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty body"),
            Self::Malformed => write!(f, "malformed command"),
            Self::UnknownAction => write!(f, "unknown action"),
            Self::LedOutOfRange(i) => write!(f, "LED {i} out of range"),
            Self::Busy => write!(f, "command channel busy"),
        }
    }
}

impl From<RequestError> for Error {
    fn from(e: RequestError) -> Self {
        Self::Request(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
