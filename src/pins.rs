//! GPIO pin assignments for the panel board (ESP32-S3 DevKitC layout).
//!
//! Single source of truth: `main` takes the matching peripherals by
//! these numbers, and the board layout's label order follows the array
//! order here.

// ---------------------------------------------------------------------------
// Buttons (active-low momentary switches, internal pull-up)
// ---------------------------------------------------------------------------

/// Button 1..4, in board-layout order.
pub const BUTTON_GPIOS: [i32; 4] = [4, 5, 6, 7];

/// Buttons pull the line to ground when pressed.
pub const BUTTONS_ACTIVE_LOW: bool = true;

/// Scan period for the button sampler (milliseconds).  Switch bounce is
/// shorter than this, so consecutive scans see clean levels.
pub const BUTTON_SCAN_MS: u64 = 20;

// ---------------------------------------------------------------------------
// LEDs (discrete, sourced from the GPIO through a resistor)
// ---------------------------------------------------------------------------

/// LED 1..4, in board-layout order.
pub const LED_GPIOS: [i32; 4] = [10, 11, 12, 13];
