//! Button module: owns one [`ButtonMachine`] per configured button.
//!
//! ```text
//!   GPIO callback ──try_send──▶ sample queue ──process_pending──▶ machines
//!   (levels, changed)            (depth 16)                          │
//!                                                           ButtonMsg ▼
//!                                                              bus.button
//! ```
//!
//! The driver callback only enqueues; machine mutation and publishing
//! happen on the control loop.  Publish failures are logged and dropped.

use core::sync::atomic::{AtomicU32, Ordering};
use core::time::Duration;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, error, warn};

use super::ports::Clock;
use crate::board::{BoardLayout, MAX_BUTTONS};
use crate::bus::Bus;
use crate::error::IndexError;
use crate::fsm::button::ButtonMachine;
use crate::messages::ButtonMsg;

/// Pending driver samples before new ones are dropped.
const SAMPLE_DEPTH: usize = 16;

/// Point-in-time snapshot from the input driver.  Bit *i* is button *i*.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonSample {
    pub levels: u32,
    pub changed: u32,
}

pub struct ButtonModule {
    bus: Arc<Bus>,
    clock: Arc<dyn Clock>,
    board: BoardLayout,
    machines: Mutex<heapless::Vec<ButtonMachine, MAX_BUTTONS>>,
    samples: Channel<CriticalSectionRawMutex, ButtonSample, SAMPLE_DEPTH>,
    dropped: AtomicU32,
    publish_timeout: Duration,
}

impl ButtonModule {
    pub fn new(
        bus: Arc<Bus>,
        clock: Arc<dyn Clock>,
        board: BoardLayout,
        publish_timeout: Duration,
    ) -> Self {
        let machines = board.button_indices().map(|_| ButtonMachine::new()).collect();
        Self {
            bus,
            clock,
            board,
            machines: Mutex::new(machines),
            samples: Channel::new(),
            dropped: AtomicU32::new(0),
            publish_timeout,
        }
    }

    /// Driver-callback entry point.  Never blocks; returns `false` if the
    /// queue was full and the sample was dropped.
    pub fn on_sample(&self, levels: u32, changed: u32) -> bool {
        if changed == 0 {
            return true;
        }
        if self.samples.try_send(ButtonSample { levels, changed }).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Drain the sample queue, running each changed button's machine once
    /// per sample.  Returns the number of messages published.
    pub fn process_pending(&self) -> usize {
        let dropped = self.dropped.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            warn!("Button: {} samples dropped (queue full)", dropped);
        }

        let mut published = 0;
        while let Ok(sample) = self.samples.try_receive() {
            for msg in self.apply(sample) {
                debug!(
                    "Button: {} {:?} (count {})",
                    self.board.button_label(msg.button),
                    msg.action,
                    msg.press_count
                );
                match self.bus.button.publish(&msg, self.publish_timeout) {
                    Ok(_) => published += 1,
                    Err(e) => error!(
                        "Button: publish {:?} for {} failed: {}",
                        msg.action,
                        self.board.button_label(msg.button),
                        e
                    ),
                }
            }
        }
        published
    }

    /// Press count for a raw button index.
    pub fn press_count(&self, raw: u8) -> Result<u32, IndexError> {
        let idx = self.board.button(raw)?;
        Ok(self.machines().get(idx.as_usize()).map_or(0, ButtonMachine::press_count))
    }

    pub fn board(&self) -> &BoardLayout {
        &self.board
    }

    fn apply(&self, sample: ButtonSample) -> heapless::Vec<ButtonMsg, MAX_BUTTONS> {
        let now = self.clock.uptime_ms();
        let mut out = heapless::Vec::new();
        let mut machines = self.machines();
        for idx in self.board.button_indices() {
            let bit = 1u32 << idx.get();
            if sample.changed & bit == 0 {
                continue;
            }
            let Some(machine) = machines.get_mut(idx.as_usize()) else {
                continue;
            };
            if let Some(action) = machine.feed(sample.levels & bit != 0) {
                // At most one message per button per sample; capacity matches.
                let _ = out.push(ButtonMsg {
                    action,
                    button: idx,
                    press_count: machine.press_count(),
                    timestamp_ms: now,
                });
            }
        }
        out
    }

    fn machines(&self) -> MutexGuard<'_, heapless::Vec<ButtonMachine, MAX_BUTTONS>> {
        self.machines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
