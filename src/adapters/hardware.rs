//! GPIO adapters over `embedded-hal` digital pins.
//!
//! - [`PinLeds`] implements [`LedOutput`] for a bank of output pins.
//! - [`ButtonScanner`] samples a bank of input pins and produces the
//!   `(levels, changed)` masks the button module consumes.
//!
//! Both are generic over the pin type so the same code drives ESP-IDF
//! `PinDriver`s on target and recording mocks on host.

use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::LedOutput;
use crate::board::{LedIndex, MAX_BUTTONS, MAX_LEDS};

// ───────────────────────────────────────────────────────────────
// LED bank
// ───────────────────────────────────────────────────────────────

/// Polarity of the LED wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

pub struct PinLeds<P: OutputPin> {
    pins: heapless::Vec<P, MAX_LEDS>,
    polarity: Polarity,
}

impl<P: OutputPin> PinLeds<P> {
    /// Pins beyond [`MAX_LEDS`] are ignored.
    pub fn new(pins: impl IntoIterator<Item = P>, polarity: Polarity) -> Self {
        Self {
            pins: pins.into_iter().take(MAX_LEDS).collect(),
            polarity,
        }
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

impl<P: OutputPin + Send> LedOutput for PinLeds<P> {
    fn set(&mut self, led: LedIndex, on: bool) {
        let Some(pin) = self.pins.get_mut(led.as_usize()) else {
            return;
        };
        let high = on == (self.polarity == Polarity::ActiveHigh);
        let result = if high { pin.set_high() } else { pin.set_low() };
        if result.is_err() {
            warn!("GPIO: LED {} write failed", led.get());
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Button scanner
// ───────────────────────────────────────────────────────────────

/// Samples button inputs.  A pressed button reads as bit = 1 regardless
/// of wiring; `active_low` handles pull-up switches.
pub struct ButtonScanner<P: InputPin> {
    pins: heapless::Vec<P, MAX_BUTTONS>,
    active_low: bool,
    last: u32,
}

impl<P: InputPin> ButtonScanner<P> {
    pub fn new(pins: impl IntoIterator<Item = P>, active_low: bool) -> Self {
        Self {
            pins: pins.into_iter().take(MAX_BUTTONS).collect(),
            active_low,
            last: 0,
        }
    }

    /// Read every pin.  Returns `(levels, changed)` since the previous
    /// scan, or `None` if nothing changed.  A failed read keeps the
    /// previous level for that pin.
    pub fn scan(&mut self) -> Option<(u32, u32)> {
        let mut levels = self.last;
        for (i, pin) in self.pins.iter_mut().enumerate() {
            let bit = 1u32 << i;
            match pin.is_high() {
                Ok(high) => {
                    if high != self.active_low {
                        levels |= bit;
                    } else {
                        levels &= !bit;
                    }
                }
                Err(_) => warn!("GPIO: button {} read failed", i),
            }
        }
        let changed = levels ^ self.last;
        self.last = levels;
        (changed != 0).then_some((levels, changed))
    }
}
