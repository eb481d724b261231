//! Property tests over the composed app.
//!
//! Runs on host only; proptest is not available for ESP32 targets.

#![cfg(not(target_os = "espidf"))]

use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use softap_panel::app::App;
use softap_panel::app::gateway::Method;
use softap_panel::app::ports::{Clock, LedOutput, NetworkPort};
use softap_panel::board::LedIndex;
use softap_panel::config::{ApConfig, SystemConfig};
use softap_panel::error::NetError;
use softap_panel::messages::{ButtonAction, ButtonMsg};

struct Zero;

impl Clock for Zero {
    fn uptime_ms(&self) -> u32 {
        0
    }
}

struct Sink;

impl LedOutput for Sink {
    fn set(&mut self, _led: LedIndex, _on: bool) {}
}

struct Radio;

impl NetworkPort for Radio {
    fn resolve_interface(&mut self) -> Result<(), NetError> {
        Ok(())
    }
    fn set_regulatory_domain(&mut self, _country: &str) -> Result<(), NetError> {
        Ok(())
    }
    fn start_dhcp_server(&mut self, _pool_start: [u8; 4]) -> Result<(), NetError> {
        Ok(())
    }
    fn enable_ap(&mut self, _params: &ApConfig) -> Result<(), NetError> {
        Ok(())
    }
    fn disable_ap(&mut self) -> Result<(), NetError> {
        Ok(())
    }
}

fn app() -> App {
    App::new(
        SystemConfig::default(),
        Arc::new(Zero),
        Box::new(Sink),
        Box::new(Radio),
    )
    .unwrap()
}

proptest! {
    /// Whatever sequence of levels the driver reports, each button's
    /// published events alternate Pressed/Released starting with Pressed,
    /// and the count on every Released equals the preceding Pressed.
    #[test]
    fn button_events_alternate(levels in proptest::collection::vec(0u32..16, 1..40)) {
        let app = app();
        let log: Arc<Mutex<Vec<ButtonMsg>>> = Arc::default();
        let sink = log.clone();
        app.bus().button.subscribe(move |m: &ButtonMsg| sink.lock().unwrap().push(*m)).unwrap();

        let mut last = 0u32;
        for level in levels {
            let changed = level ^ last;
            app.on_button_sample(level, changed);
            app.tick();
            last = level;
        }

        let log = log.lock().unwrap();
        for button in 0..4u8 {
            let mut expect = ButtonAction::Pressed;
            let mut count = 0;
            for m in log.iter().filter(|m| m.button.get() == button) {
                prop_assert_eq!(m.action, expect);
                if m.action == ButtonAction::Pressed {
                    count += 1;
                    expect = ButtonAction::Released;
                } else {
                    expect = ButtonAction::Pressed;
                }
                prop_assert_eq!(m.press_count, count);
            }
        }
    }

    /// Arbitrary request bodies never panic the gateway, and anything
    /// rejected leaves every LED untouched.
    #[test]
    fn arbitrary_bodies_are_handled(body in proptest::collection::vec(any::<u8>(), 0..64)) {
        let app = app();
        let resp = app.gateway().handle(Method::Post, "/api/led", &body);
        prop_assert!(resp.status == 200 || resp.status == 400);
        if resp.status == 400 {
            for led in 0..4 {
                prop_assert_eq!(app.leds().state_of(led), Ok(false));
            }
        }
    }

    /// LED state after a command stream matches a direct fold of the
    /// same commands.
    #[test]
    fn led_state_matches_model(cmds in proptest::collection::vec((0u8..6, 0usize..3), 0..30)) {
        let app = app();
        let mut model = [false; 4];
        for (led, action) in cmds {
            let name = ["on", "off", "toggle"][action];
            let body = format!("{{\"led\":{led},\"action\":\"{name}\"}}");
            let resp = app.gateway().handle(Method::Post, "/api/led", body.as_bytes());
            if led < 4 {
                prop_assert_eq!(resp.status, 200);
                let slot = &mut model[usize::from(led)];
                *slot = match action {
                    0 => true,
                    1 => false,
                    _ => !*slot,
                };
            } else {
                prop_assert_eq!(resp.status, 400);
            }
        }
        for (i, on) in model.iter().enumerate() {
            prop_assert_eq!(app.leds().state_of(i as u8), Ok(*on));
        }
    }
}
