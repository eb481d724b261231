//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ modules in `app` (domain)
//! ```
//!
//! Driven adapters (LED pins, the radio, the HTTP listener, the clock)
//! implement these traits.  The modules hold them as trait objects so the
//! domain core never touches hardware directly and host tests can swap in
//! recording mocks.

use crate::board::LedIndex;
use crate::config::ApConfig;
use crate::error::NetError;

// ───────────────────────────────────────────────────────────────
// LED output (driven adapter: domain → GPIO)
// ───────────────────────────────────────────────────────────────

/// Physical output sink.  Synchronous and infallible at this layer.
pub trait LedOutput: Send {
    fn set(&mut self, led: LedIndex, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Monotonic milliseconds since boot, used for message timestamps.
pub trait Clock: Send + Sync {
    fn uptime_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Network management collaborator (driven adapter: domain → radio)
// ───────────────────────────────────────────────────────────────

/// Requests the SoftAP controller makes during bring-up and tear-down.
///
/// `enable_ap` only *requests* the AP; success is confirmed later through
/// a [`NetEvent::ApEnableResult`](crate::network::NetEvent) delivered by
/// the adapter's event source.
pub trait NetworkPort: Send {
    /// Locate the wireless interface.  `Err(NoDevice)` if absent.
    fn resolve_interface(&mut self) -> Result<(), NetError>;

    /// Set the regulatory domain (two-letter country code).
    fn set_regulatory_domain(&mut self, country: &str) -> Result<(), NetError>;

    /// Start the DHCP server handing out leases from `pool_start`.
    /// `Err(AlreadyRunning)` is not a failure.
    fn start_dhcp_server(&mut self, pool_start: [u8; 4]) -> Result<(), NetError>;

    /// Request AP enable with the configured SSID, password, channel and security.
    fn enable_ap(&mut self, params: &ApConfig) -> Result<(), NetError>;

    fn disable_ap(&mut self) -> Result<(), NetError>;
}

// ───────────────────────────────────────────────────────────────
// HTTP listener (driven adapter: gateway → transport)
// ───────────────────────────────────────────────────────────────

/// Transport that serves the gateway's routes once started.
pub trait HttpServerPort: Send {
    fn start(&mut self, port: u16) -> Result<(), crate::error::Error>;
}
