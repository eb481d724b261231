//! Application service: the composition root.
//!
//! [`App`] builds the bus once, constructs every module around it and
//! registers their listeners.  Driver callbacks and the control loop talk
//! to the modules only through the methods here.
//!
//! ```text
//!  button driver ──▶ ┌───────────────────────────────┐ ──▶ LedOutput
//!                    │  Bus ─ Buttons ─ LEDs          │
//!  radio events  ──▶ │  SoftAP ─ NetworkMonitor       │ ──▶ NetworkPort
//!                    │  Gateway ─ LogTap              │
//!                    └───────────────────────────────┘
//! ```

use std::sync::Arc;

use log::info;

use super::button::ButtonModule;
use super::gateway::Gateway;
use super::led::LedModule;
use super::ports::{Clock, LedOutput, NetworkPort};
use super::softap::ApController;
use crate::adapters::log_sink::LogTap;
use crate::bus::Bus;
use crate::config::SystemConfig;
use crate::error::Error;
use crate::fsm::softap::ApState;
use crate::network::{NetEvent, NetworkMonitor};

pub struct App {
    config: SystemConfig,
    bus: Arc<Bus>,
    buttons: Arc<ButtonModule>,
    leds: Arc<LedModule>,
    softap: Arc<ApController>,
    network: Arc<NetworkMonitor>,
    gateway: Arc<Gateway>,
}

impl App {
    /// Validate `config`, build every module and register listeners.
    /// LED outputs are driven to their initial `Off` state before returning.
    pub fn new(
        config: SystemConfig,
        clock: Arc<dyn Clock>,
        leds: Box<dyn LedOutput>,
        net: Box<dyn NetworkPort>,
    ) -> Result<Self, Error> {
        config.validate()?;
        let timeout = config.timing.publish_timeout();
        let bus = Arc::new(Bus::new());

        let buttons = Arc::new(ButtonModule::new(
            bus.clone(),
            clock,
            config.board.clone(),
            timeout,
        ));
        let leds = Arc::new(LedModule::new(bus.clone(), config.board.clone(), leds));
        let softap = Arc::new(ApController::new(
            bus.clone(),
            config.ap.clone(),
            net,
            timeout,
        ));
        let gateway = Arc::new(Gateway::new(
            bus.clone(),
            leds.clone(),
            config.board.clone(),
            config.http,
            config.ap.gateway,
            timeout,
        ));

        leds.attach()?;
        gateway.attach()?;
        LogTap::attach(&bus, &config.board)?;

        leds.start();
        info!(
            "App: {} buttons, {} LEDs, SoftAP '{}'",
            config.board.button_count(),
            config.board.led_count(),
            config.ap.ssid
        );

        Ok(Self {
            config,
            bus,
            buttons,
            leds,
            softap,
            network: Arc::new(NetworkMonitor::new()),
            gateway,
        })
    }

    // ── Driver entry points ───────────────────────────────────

    /// Button driver callback.  Enqueues only.
    pub fn on_button_sample(&self, levels: u32, changed: u32) -> bool {
        self.buttons.on_sample(levels, changed)
    }

    /// Network-management callback: record in the monitor, then push to
    /// the SoftAP machine.
    pub fn on_net_event(&self, event: NetEvent) {
        self.network.handle(&event);
        self.softap.on_net_event(event);
    }

    // ── Control loop ──────────────────────────────────────────

    /// Drain module queues.  Call every `timing.tick_interval_ms`.
    pub fn tick(&self) -> usize {
        let published = self.buttons.process_pending();
        self.softap.run();
        published
    }

    /// Coarse SoftAP poll.  Call every `timing.ap_poll_interval_ms`.
    pub fn poll_softap(&self) {
        self.softap.poll();
    }

    pub fn start_softap(&self) -> ApState {
        self.softap.start()
    }

    pub fn stop_softap(&self) -> ApState {
        self.softap.stop()
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn bus(&self) -> &Arc<Bus> {
        &self.bus
    }

    pub fn buttons(&self) -> &Arc<ButtonModule> {
        &self.buttons
    }

    pub fn leds(&self) -> &Arc<LedModule> {
        &self.leds
    }

    pub fn softap(&self) -> &Arc<ApController> {
        &self.softap
    }

    pub fn network(&self) -> &Arc<NetworkMonitor> {
        &self.network
    }

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }
}
