//! Board description: how many buttons and LEDs exist and what they are called.
//!
//! The layout is fixed at startup and sizes every per-module arena.  Raw
//! indices coming from drivers or HTTP requests are turned into
//! [`ButtonIndex`] / [`LedIndex`] here; nothing downstream indexes an arena
//! with an unchecked integer.

use core::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::IndexError;

/// Upper bound on buttons a board may declare (one bit each in the sample mask).
pub const MAX_BUTTONS: usize = 8;
/// Upper bound on LEDs a board may declare.
pub const MAX_LEDS: usize = 8;

/// Human-readable label for a button or LED.
pub type Label = heapless::String<16>;

// ── Validated indices ─────────────────────────────────────────

/// Index of a configured button.  Only [`BoardLayout::button`] constructs one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ButtonIndex(u8);

impl ButtonIndex {
    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Index of a configured LED.  Only [`BoardLayout::led`] constructs one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LedIndex(u8);

impl LedIndex {
    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

// ── Layout ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardLayout {
    pub buttons: heapless::Vec<Label, MAX_BUTTONS>,
    pub leds: heapless::Vec<Label, MAX_LEDS>,
}

impl Default for BoardLayout {
    /// Four buttons and four LEDs, as on the reference dev kit.
    fn default() -> Self {
        Self::with_counts(4, 4)
    }
}

impl BoardLayout {
    /// Layout with generated labels ("Button 1", "LED 1", ...).
    /// Counts above the compile-time maxima are clamped.
    pub fn with_counts(buttons: usize, leds: usize) -> Self {
        let mut layout = Self {
            buttons: heapless::Vec::new(),
            leds: heapless::Vec::new(),
        };
        for n in 1..=buttons.min(MAX_BUTTONS) {
            let _ = layout.buttons.push(numbered("Button", n));
        }
        for n in 1..=leds.min(MAX_LEDS) {
            let _ = layout.leds.push(numbered("LED", n));
        }
        layout
    }

    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    pub fn led_count(&self) -> usize {
        self.leds.len()
    }

    /// Validate a raw button index.
    pub fn button(&self, raw: u8) -> Result<ButtonIndex, IndexError> {
        if (raw as usize) < self.buttons.len() {
            Ok(ButtonIndex(raw))
        } else {
            Err(IndexError::Button(raw))
        }
    }

    /// Validate a raw LED index.
    pub fn led(&self, raw: u8) -> Result<LedIndex, IndexError> {
        if (raw as usize) < self.leds.len() {
            Ok(LedIndex(raw))
        } else {
            Err(IndexError::Led(raw))
        }
    }

    pub fn button_label(&self, idx: ButtonIndex) -> &str {
        self.buttons.get(idx.as_usize()).map_or("", |l| l.as_str())
    }

    pub fn led_label(&self, idx: LedIndex) -> &str {
        self.leds.get(idx.as_usize()).map_or("", |l| l.as_str())
    }

    pub fn button_indices(&self) -> impl Iterator<Item = ButtonIndex> + '_ {
        (0..self.buttons.len()).map(|i| ButtonIndex(i as u8))
    }

    pub fn led_indices(&self) -> impl Iterator<Item = LedIndex> + '_ {
        (0..self.leds.len()).map(|i| LedIndex(i as u8))
    }
}

fn numbered(prefix: &str, n: usize) -> Label {
    let mut label = Label::new();
    // "Button 8" is the longest generated label; fits in 16 bytes.
    let _ = write!(label, "{prefix} {n}");
    label
}
