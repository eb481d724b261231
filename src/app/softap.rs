//! SoftAP controller: executes the lifecycle machine's effects.
//!
//! ```text
//!   start()/stop() ─────────────────────────┐
//!   radio callback ─▶ on_net_event ─▶ queue ─┤
//!   control loop ──▶ poll() (ready latch) ───┤
//!                                            ▼
//!                        lock ▸ transition ▸ store ▸ unlock
//!                                            │
//!                      BeginBringUp / TearDown / Announce ──▶ NetworkPort, bus.ap
//! ```
//!
//! The state lock covers only compare-and-transition.  Collaborator I/O
//! and publishing happen after it is released, so the push path and the
//! poll path can race safely and a listener reacting to a lifecycle
//! message may call back into the controller.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{error, info, warn};

use super::ports::NetworkPort;
use crate::bus::Bus;
use crate::config::ApConfig;
use crate::error::NetError;
use crate::fsm::softap::{ApEffect, ApInput, ApNotice, ApState, transition};
use crate::messages::{ApEventKind, ApMsg, Mac};
use crate::network::NetEvent;

/// Pending collaborator events before new ones are dropped.
const EVENT_DEPTH: usize = 8;

pub struct ApController {
    bus: Arc<Bus>,
    config: ApConfig,
    state: Mutex<ApState>,
    net: Mutex<Box<dyn NetworkPort>>,
    events: Channel<CriticalSectionRawMutex, NetEvent, EVENT_DEPTH>,
    /// Held by whichever path is draining `events`; keeps the queue
    /// single-consumer so lifecycle messages follow arrival order.
    drain: Mutex<()>,
    /// Set by a successful enable result; lets `poll` finish bring-up
    /// even if the event itself was dropped.
    ready: AtomicBool,
    publish_timeout: Duration,
}

impl ApController {
    pub fn new(
        bus: Arc<Bus>,
        config: ApConfig,
        net: Box<dyn NetworkPort>,
        publish_timeout: Duration,
    ) -> Self {
        info!("SoftAP: Idle");
        Self {
            bus,
            config,
            state: Mutex::new(ApState::Idle),
            net: Mutex::new(net),
            events: Channel::new(),
            drain: Mutex::new(()),
            ready: AtomicBool::new(false),
            publish_timeout,
        }
    }

    pub fn state(&self) -> ApState {
        *self.lock_state()
    }

    /// Request bring-up.  Returns the state once the synchronous part of
    /// bring-up has finished: `Starting` while awaiting confirmation, or
    /// `Error` if the interface or enable request failed.
    pub fn start(&self) -> ApState {
        self.step(ApInput::StartRequested);
        self.state()
    }

    pub fn stop(&self) -> ApState {
        self.step(ApInput::StopRequested);
        self.state()
    }

    /// Push path: called from the collaborator's event callback.
    pub fn on_net_event(&self, event: NetEvent) {
        if event == NetEvent::ApEnableResult(0) {
            self.ready.store(true, Ordering::Release);
        }
        if self.events.try_send(event).is_err() {
            warn!("SoftAP: event queue full, {:?} dropped", event);
        }
        self.run();
    }

    /// Drain queued collaborator events through the machine.
    ///
    /// Only one caller drains at a time.  A caller that finds the gate
    /// taken returns at once; its event is picked up by the active
    /// drainer, or by the re-check after the gate is released.  The gate
    /// is never waited on, so a lifecycle listener may re-enter here.
    pub fn run(&self) {
        loop {
            let gate = match self.drain.try_lock() {
                Ok(gate) => gate,
                Err(TryLockError::Poisoned(p)) => p.into_inner(),
                Err(TryLockError::WouldBlock) => return,
            };
            while let Ok(event) = self.events.try_receive() {
                let input = match event {
                    NetEvent::ApEnableResult(code) => ApInput::EnableResult(code),
                    NetEvent::StationConnected(mac) => ApInput::StationConnected(mac),
                    NetEvent::StationDisconnected(mac) => ApInput::StationDisconnected(mac),
                    NetEvent::InterfaceUp | NetEvent::InterfaceDown => continue,
                };
                self.step(input);
            }
            drop(gate);
            if self.events.is_empty() {
                return;
            }
        }
    }

    /// Coarse periodic run.  A no-op unless a queued event or the ready
    /// latch has something new for the current state.
    pub fn poll(&self) {
        self.run();
        self.step(ApInput::Poll {
            ready: self.ready.load(Ordering::Acquire),
        });
    }

    fn step(&self, input: ApInput) {
        let mut next_input = Some(input);
        while let Some(input) = next_input.take() {
            let (from, step) = {
                let mut state = self.lock_state();
                let from = *state;
                let step = transition(from, input);
                *state = step.next;
                (from, step)
            };
            if from != step.next {
                info!("SoftAP: {:?} -> {:?}", from, step.next);
            }
            match step.effect {
                None => {}
                Some(ApEffect::BeginBringUp) => {
                    self.ready.store(false, Ordering::Release);
                    if let Err(e) = self.bring_up() {
                        next_input = Some(ApInput::BringUpFailed(e.code()));
                    }
                }
                Some(ApEffect::TearDown) => {
                    self.ready.store(false, Ordering::Release);
                    if let Err(e) = self.lock_net().disable_ap() {
                        warn!("SoftAP: disable failed: {}", e);
                    }
                    self.announce(ApNotice::Stopped);
                }
                Some(ApEffect::Announce(notice)) => self.announce(notice),
            }
        }
    }

    fn bring_up(&self) -> Result<(), NetError> {
        info!("SoftAP: starting '{}'", self.config.ssid);
        let mut net = self.lock_net();

        net.resolve_interface().map_err(|e| {
            error!("SoftAP: no wireless interface: {}", e);
            NetError::NoDevice
        })?;

        if let Err(e) = net.set_regulatory_domain(&self.config.country_code) {
            warn!(
                "SoftAP: regulatory domain {} not applied: {}",
                self.config.country_code, e
            );
        }

        match net.start_dhcp_server(self.config.dhcp_pool_start) {
            Ok(()) => info!("SoftAP: DHCP server started"),
            Err(NetError::AlreadyRunning) => info!("SoftAP: DHCP server already running"),
            Err(e) => error!("SoftAP: DHCP server failed: {}", e),
        }

        net.enable_ap(&self.config).map_err(|e| {
            error!("SoftAP: enable request failed: {}", e);
            e
        })?;
        info!("SoftAP: enable requested, SSID '{}'", self.config.ssid);
        Ok(())
    }

    fn announce(&self, notice: ApNotice) {
        let (kind, error_code) = match notice {
            ApNotice::Started => (ApEventKind::Started, 0),
            ApNotice::Stopped => (ApEventKind::Stopped, 0),
            ApNotice::ClientConnected(mac) => {
                info!("SoftAP: client {} joined", Mac(&mac));
                (ApEventKind::ClientConnected(mac), 0)
            }
            ApNotice::ClientDisconnected(mac) => {
                info!("SoftAP: client {} left", Mac(&mac));
                (ApEventKind::ClientDisconnected(mac), 0)
            }
            ApNotice::Error(code) => {
                error!("SoftAP: error {}", code);
                (ApEventKind::Error, code)
            }
        };
        let msg = ApMsg {
            kind,
            ssid: self.config.ssid.clone(),
            channel: self.config.channel,
            error_code,
        };
        if let Err(e) = self.bus.ap.publish(&msg, self.publish_timeout) {
            error!("SoftAP: publish {:?} failed: {}", kind, e);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ApState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_net(&self) -> MutexGuard<'_, Box<dyn NetworkPort>> {
        self.net.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
