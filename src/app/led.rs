//! LED module: owns one [`LedMachine`] per configured LED and the output sink.
//!
//! ```text
//!   bus.led_cmd ──listener──▶ submit + run ──▶ LedOutput::set
//!                                   │
//!                                   └──▶ bus.led_state (no wait)
//! ```
//!
//! Machine state and the output are mutated under one lock, which is
//! released before the resulting state message is published.

use core::time::Duration;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use log::{debug, info, warn};
use serde::Serialize;

use super::ports::LedOutput;
use crate::board::{BoardLayout, LedIndex, MAX_LEDS};
use crate::bus::Bus;
use crate::error::{BusError, IndexError};
use crate::fsm::led::LedMachine;
use crate::messages::{LedAction, LedCmdMsg, LedStateMsg};

struct LedBank {
    machines: heapless::Vec<LedMachine, MAX_LEDS>,
    output: Box<dyn LedOutput>,
}

pub struct LedModule {
    bus: Arc<Bus>,
    board: BoardLayout,
    bank: Mutex<LedBank>,
}

#[derive(Serialize)]
struct LedEntry<'a> {
    number: u8,
    name: &'a str,
    is_on: bool,
}

#[derive(Serialize)]
struct LedSnapshot<'a> {
    leds: Vec<LedEntry<'a>>,
}

impl LedModule {
    pub fn new(bus: Arc<Bus>, board: BoardLayout, output: Box<dyn LedOutput>) -> Self {
        let machines = board.led_indices().map(|_| LedMachine::new()).collect();
        Self {
            bus,
            board,
            bank: Mutex::new(LedBank { machines, output }),
        }
    }

    /// Run every machine's initial `Off` entry so the outputs agree with
    /// logical state before the first command.
    pub fn start(&self) {
        {
            let mut bank = self.bank();
            let LedBank { machines, output } = &mut *bank;
            for (idx, machine) in self.board.led_indices().zip(machines.iter_mut()) {
                let drive = machine.start();
                output.set(idx, drive.0);
            }
        }
        for led in self.board.led_indices() {
            self.publish_state(LedStateMsg { led, on: false });
        }
        info!("LED: {} outputs initialised off", self.board.led_count());
    }

    /// Subscribe to the command channel.  The listener holds a weak
    /// reference; the bus never keeps the module alive.
    pub fn attach(self: &Arc<Self>) -> Result<(), BusError> {
        let weak: Weak<Self> = Arc::downgrade(self);
        self.bus.led_cmd.subscribe(move |cmd: &LedCmdMsg| {
            if let Some(leds) = weak.upgrade() {
                leds.handle_command(cmd);
            }
        })
    }

    /// Buffer and immediately consume one command.
    pub fn handle_command(&self, cmd: &LedCmdMsg) {
        if self.submit(cmd.led, cmd.action) {
            debug!("LED: {} pending command overwritten", self.board.led_label(cmd.led));
        }
        self.run(cmd.led);
    }

    /// Buffer a command without running the machine.  Returns `true` if an
    /// unconsumed command was replaced.
    pub fn submit(&self, led: LedIndex, action: LedAction) -> bool {
        self.bank()
            .machines
            .get_mut(led.as_usize())
            .is_some_and(|m| m.submit(action))
    }

    /// Consume the pending command for `led`.  Returns the new level if
    /// the machine changed state.
    pub fn run(&self, led: LedIndex) -> Option<bool> {
        let on = {
            let mut bank = self.bank();
            let LedBank { machines, output } = &mut *bank;
            let on = machines.get_mut(led.as_usize())?.run()?;
            output.set(led, on);
            on
        };
        info!(
            "LED: {} turned {}",
            self.board.led_label(led),
            if on { "ON" } else { "OFF" }
        );
        self.publish_state(LedStateMsg { led, on });
        Some(on)
    }

    pub fn is_on(&self, led: LedIndex) -> bool {
        self.bank()
            .machines
            .get(led.as_usize())
            .is_some_and(LedMachine::is_on)
    }

    /// State query by raw index, for callers outside the validated domain.
    pub fn state_of(&self, raw: u8) -> Result<bool, IndexError> {
        let led = self.board.led(raw)?;
        Ok(self.is_on(led))
    }

    /// `{"leds":[{"number":0,"name":"LED 1","is_on":false},...]}`
    pub fn snapshot_json(&self) -> String {
        let states: heapless::Vec<bool, MAX_LEDS> =
            self.bank().machines.iter().map(LedMachine::is_on).collect();
        let leds = self
            .board
            .led_indices()
            .zip(states)
            .map(|(idx, is_on)| LedEntry {
                number: idx.get(),
                name: self.board.led_label(idx),
                is_on,
            })
            .collect();
        serde_json::to_string(&LedSnapshot { leds }).unwrap_or_else(|_| String::from("{\"leds\":[]}"))
    }

    pub fn board(&self) -> &BoardLayout {
        &self.board
    }

    fn publish_state(&self, msg: LedStateMsg) {
        if let Err(e) = self.bus.led_state.publish(&msg, Duration::ZERO) {
            warn!(
                "LED: state for {} not published: {}",
                self.board.led_label(msg.led),
                e
            );
        }
    }

    fn bank(&self) -> MutexGuard<'_, LedBank> {
        self.bank.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
