//! HTTP-style control surface.
//!
//! The gateway is both a bus listener and a bus publisher:
//!
//! ```text
//!   bus.button ──▶ button view (pressed, count) ──▶ GET /api/buttons
//!   LedModule  ──────────────── snapshot ──────────▶ GET /api/leds
//!   POST /api/led ──▶ parse ▸ validate ──▶ bus.led_cmd
//!   bus.ap (Started) ──▶ start signal ──▶ launch(): settle ▸ HttpServerPort::start
//! ```
//!
//! Requests are validated completely before anything is published: a
//! malformed body or an out-of-range LED never reaches the bus.

use core::time::Duration;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use futures_lite::future;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::led::LedModule;
use super::ports::HttpServerPort;
use crate::adapters::utils::ipv4;
use crate::board::{BoardLayout, MAX_BUTTONS};
use crate::bus::Bus;
use crate::config::HttpConfig;
use crate::error::{BusError, Error, RequestError};
use crate::messages::{ApEventKind, ApMsg, ButtonAction, ButtonMsg, LedAction, LedCmdMsg};

pub const JSON: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl ApiResponse {
    fn json(body: String) -> Self {
        Self {
            status: 200,
            content_type: JSON,
            body,
        }
    }

    fn empty() -> Self {
        Self {
            status: 200,
            content_type: JSON,
            body: String::new(),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        let body = serde_json::to_string(&ErrorBody { error: message })
            .unwrap_or_default();
        Self {
            status,
            content_type: JSON,
            body,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

#[derive(Deserialize)]
struct CommandBody<'a> {
    led: u8,
    action: &'a str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ButtonView {
    pressed: bool,
    count: u32,
}

#[derive(Serialize)]
struct ButtonEntry<'a> {
    number: u8,
    name: &'a str,
    pressed: bool,
    count: u32,
}

#[derive(Serialize)]
struct ButtonSnapshot<'a> {
    buttons: Vec<ButtonEntry<'a>>,
}

pub struct Gateway {
    bus: Arc<Bus>,
    leds: Arc<LedModule>,
    board: BoardLayout,
    buttons: Mutex<heapless::Vec<ButtonView, MAX_BUTTONS>>,
    start: Signal<CriticalSectionRawMutex, ()>,
    http: HttpConfig,
    address: [u8; 4],
    publish_timeout: Duration,
}

impl Gateway {
    pub fn new(
        bus: Arc<Bus>,
        leds: Arc<LedModule>,
        board: BoardLayout,
        http: HttpConfig,
        address: [u8; 4],
        publish_timeout: Duration,
    ) -> Self {
        let buttons = board.button_indices().map(|_| ButtonView::default()).collect();
        Self {
            bus,
            leds,
            board,
            buttons: Mutex::new(buttons),
            start: Signal::new(),
            http,
            address,
            publish_timeout,
        }
    }

    /// Subscribe to button events and SoftAP lifecycle.
    pub fn attach(self: &Arc<Self>) -> Result<(), BusError> {
        let weak: Weak<Self> = Arc::downgrade(self);
        self.bus.button.subscribe(move |msg: &ButtonMsg| {
            if let Some(gw) = weak.upgrade() {
                gw.on_button(msg);
            }
        })?;
        let weak: Weak<Self> = Arc::downgrade(self);
        self.bus.ap.subscribe(move |msg: &ApMsg| {
            if let Some(gw) = weak.upgrade() {
                gw.on_lifecycle(msg);
            }
        })
    }

    // ── Command intake ────────────────────────────────────────

    /// Validate and publish an LED command.
    pub fn command(&self, raw_led: u8, action: LedAction) -> Result<(), RequestError> {
        let led = self
            .board
            .led(raw_led)
            .map_err(|_| RequestError::LedOutOfRange(raw_led))?;
        self.bus
            .led_cmd
            .publish(&LedCmdMsg { action, led }, self.publish_timeout)
            .map_err(|e| {
                warn!("Gateway: LED command {} for {} not published: {}", action, raw_led, e);
                RequestError::Busy
            })?;
        Ok(())
    }

    /// Parse `{"led":<n>,"action":"on"|"off"|"toggle"}`.
    pub fn parse_command(body: &[u8]) -> Result<(u8, LedAction), RequestError> {
        if body.is_empty() {
            return Err(RequestError::Empty);
        }
        let cmd: CommandBody<'_> =
            serde_json::from_slice(body).map_err(|_| RequestError::Malformed)?;
        Ok((cmd.led, cmd.action.parse()?))
    }

    // ── Routing ───────────────────────────────────────────────

    pub fn handle(&self, method: Method, path: &str, body: &[u8]) -> ApiResponse {
        match (method, path) {
            (Method::Get, "/api/leds") => ApiResponse::json(self.leds.snapshot_json()),
            (Method::Get, "/api/buttons") => ApiResponse::json(self.buttons_json()),
            (Method::Post, "/api/led") => {
                match Self::parse_command(body).and_then(|(led, action)| self.command(led, action)) {
                    Ok(()) => ApiResponse::empty(),
                    Err(e) => {
                        warn!("Gateway: rejected LED command: {}", e);
                        ApiResponse::error(e.status(), &e.to_string())
                    }
                }
            }
            (_, "/api/leds" | "/api/buttons" | "/api/led") => {
                ApiResponse::error(405, "method not allowed")
            }
            _ => ApiResponse::error(404, "not found"),
        }
    }

    /// `{"buttons":[{"number":0,"name":"Button 1","pressed":false,"count":0},...]}`
    pub fn buttons_json(&self) -> String {
        let views = self.views().clone();
        let buttons = self
            .board
            .button_indices()
            .zip(views)
            .map(|(idx, v)| ButtonEntry {
                number: idx.get(),
                name: self.board.button_label(idx),
                pressed: v.pressed,
                count: v.count,
            })
            .collect();
        serde_json::to_string(&ButtonSnapshot { buttons })
            .unwrap_or_else(|_| String::from("{\"buttons\":[]}"))
    }

    // ── Service start ─────────────────────────────────────────

    /// `true` once a `Started` lifecycle message has been seen (consumes it).
    pub fn start_requested(&self) -> bool {
        self.start.try_take().is_some()
    }

    /// Block until the SoftAP reports `Started`, wait the settle delay,
    /// then open the listener.
    pub fn launch(&self, server: &mut dyn HttpServerPort) -> Result<(), Error> {
        future::block_on(self.start.wait());
        std::thread::sleep(Duration::from_millis(u64::from(self.http.settle_delay_ms)));
        server.start(self.http.port)?;
        info!(
            "Gateway: listening on http://{}:{}/",
            ipv4(self.address),
            self.http.port
        );
        Ok(())
    }

    // ── Listeners ─────────────────────────────────────────────

    fn on_button(&self, msg: &ButtonMsg) {
        if let Some(view) = self.views().get_mut(msg.button.as_usize()) {
            view.pressed = msg.action == ButtonAction::Pressed;
            view.count = msg.press_count;
        }
    }

    fn on_lifecycle(&self, msg: &ApMsg) {
        if msg.kind == ApEventKind::Started {
            info!(
                "Gateway: SoftAP '{}' up, starting in {} ms",
                msg.ssid, self.http.settle_delay_ms
            );
            self.start.signal(());
        }
    }

    fn views(&self) -> MutexGuard<'_, heapless::Vec<ButtonView, MAX_BUTTONS>> {
        self.buttons.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
