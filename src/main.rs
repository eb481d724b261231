//! SoftAP Panel firmware entry point.
//!
//! Wires the hardware adapters to the [`App`] composition root and runs
//! the control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  ButtonScanner   PinLeds       WifiApAdapter   HttpServer      │
//! │  (sampler)       (LedOutput)   (NetworkPort)   (HttpServerPort)│
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │     App: Bus · Buttons · LEDs · SoftAP · Gateway       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  scanner thread · gateway launcher thread · tick loop (main)   │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use esp_idf_hal::gpio::{AnyInputPin, AnyOutputPin, PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;
use log::{error, info, warn};

use softap_panel::adapters::hardware::{ButtonScanner, PinLeds, Polarity};
use softap_panel::adapters::http::HttpServer;
use softap_panel::adapters::time::SystemClock;
use softap_panel::adapters::wifi::WifiApAdapter;
use softap_panel::app::App;
use softap_panel::config::SystemConfig;
use softap_panel::pins;

const TASK_STACK: usize = 8 * 1024;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SoftAP Panel v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── 2. Radio ──────────────────────────────────────────────
    let wifi = match EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs)) {
        Ok(w) => Some(w),
        Err(e) => {
            // The app still runs; the SoftAP machine reports NoDevice.
            warn!("WiFi driver init failed ({}), running without radio", e);
            None
        }
    };
    let wifi = WifiApAdapter::new(wifi, &sysloop)?;
    let relay = wifi.relay();

    // ── 3. LED outputs (pins::LED_GPIOS order) ────────────────
    // SAFETY (both pin tables): each GPIO number is claimed exactly once
    // here, and `peripherals.pins` is never touched, so no pin is aliased.
    let led_pins = pins::LED_GPIOS
        .iter()
        .map(|&gpio| PinDriver::output(unsafe { AnyOutputPin::new(gpio) }))
        .collect::<Result<Vec<_>, _>>()?;
    let leds = PinLeds::new(led_pins, Polarity::ActiveHigh);

    // ── 4. Button inputs (pins::BUTTON_GPIOS order) ───────────
    let mut button_pins = pins::BUTTON_GPIOS
        .iter()
        .map(|&gpio| PinDriver::input(unsafe { AnyInputPin::new(gpio) }))
        .collect::<Result<Vec<_>, _>>()?;
    for pin in button_pins.iter_mut() {
        pin.set_pull(Pull::Up)?;
    }
    let mut scanner = ButtonScanner::new(button_pins, pins::BUTTONS_ACTIVE_LOW);

    // ── 5. Application ────────────────────────────────────────
    let config = SystemConfig::default();
    let timing = config.timing;
    let app = Arc::new(App::new(
        config,
        Arc::new(SystemClock::new()),
        Box::new(leds),
        Box::new(wifi),
    )?);

    let weak = Arc::downgrade(&app);
    relay.connect(move |event| {
        if let Some(app) = weak.upgrade() {
            app.on_net_event(event);
        }
    });

    // ── 6. Gateway launcher ───────────────────────────────────
    // Blocks until the SoftAP announces Started, then binds the listener.
    // The thread keeps the server alive afterwards.
    let gateway = app.gateway().clone();
    thread::Builder::new()
        .name("gateway".into())
        .stack_size(TASK_STACK)
        .spawn(move || {
            let mut server = HttpServer::new(gateway.clone());
            if let Err(e) = gateway.launch(&mut server) {
                error!("Gateway: launch failed: {}", e);
                return;
            }
            loop {
                thread::park();
            }
        })?;

    // ── 7. Button sampler ─────────────────────────────────────
    let sampler = Arc::downgrade(&app);
    thread::Builder::new()
        .name("buttons".into())
        .stack_size(TASK_STACK)
        .spawn(move || {
            loop {
                if let Some((levels, changed)) = scanner.scan() {
                    let Some(app) = sampler.upgrade() else { return };
                    if !app.on_button_sample(levels, changed) {
                        warn!("Button: sample queue full");
                    }
                }
                thread::sleep(Duration::from_millis(pins::BUTTON_SCAN_MS));
            }
        })?;

    // ── 8. SoftAP bring-up ────────────────────────────────────
    thread::sleep(Duration::from_millis(u64::from(timing.ap_start_delay_ms)));
    let state = app.start_softap();
    info!("SoftAP: start requested, now {:?}", state);

    // ── 9. Control loop ───────────────────────────────────────
    let tick = Duration::from_millis(u64::from(timing.tick_interval_ms));
    let poll_every = Duration::from_millis(u64::from(timing.ap_poll_interval_ms));
    let mut last_poll = Instant::now();
    loop {
        app.tick();
        if last_poll.elapsed() >= poll_every {
            app.poll_softap();
            last_poll = Instant::now();
        }
        thread::sleep(tick);
    }
}
