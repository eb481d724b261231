//! Mock adapters for integration tests.
//!
//! Every mock records into shared state so tests can assert on the full
//! call history after the mock has been moved into the [`App`].

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use softap_panel::app::App;
use softap_panel::app::ports::{Clock, HttpServerPort, LedOutput, NetworkPort};
use softap_panel::board::LedIndex;
use softap_panel::bus::Channel;
use softap_panel::config::{ApConfig, SystemConfig};
use softap_panel::error::{Error, NetError};

// ── LEDs ──────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockLeds {
    pub writes: Arc<Mutex<Vec<(u8, bool)>>>,
}

#[allow(dead_code)]
impl MockLeds {
    pub fn writes(&self) -> Vec<(u8, bool)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.writes.lock().unwrap().clear();
    }
}

impl LedOutput for MockLeds {
    fn set(&mut self, led: LedIndex, on: bool) {
        self.writes.lock().unwrap().push((led.get(), on));
    }
}

// ── Network collaborator ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetCall {
    Resolve,
    Country(String),
    Dhcp([u8; 4]),
    Enable(String),
    Disable,
}

/// Scripted radio.  Enable requests succeed synchronously unless
/// `enable_error` is set; confirmation is left to the test.
#[derive(Clone, Default)]
pub struct MockNetwork {
    pub calls: Arc<Mutex<Vec<NetCall>>>,
    pub no_device: bool,
    pub enable_error: Option<NetError>,
}

#[allow(dead_code)]
impl MockNetwork {
    pub fn calls(&self) -> Vec<NetCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &NetCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: NetCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl NetworkPort for MockNetwork {
    fn resolve_interface(&mut self) -> Result<(), NetError> {
        self.record(NetCall::Resolve);
        if self.no_device { Err(NetError::NoDevice) } else { Ok(()) }
    }

    fn set_regulatory_domain(&mut self, country: &str) -> Result<(), NetError> {
        self.record(NetCall::Country(country.to_string()));
        Ok(())
    }

    fn start_dhcp_server(&mut self, pool_start: [u8; 4]) -> Result<(), NetError> {
        self.record(NetCall::Dhcp(pool_start));
        Ok(())
    }

    fn enable_ap(&mut self, params: &ApConfig) -> Result<(), NetError> {
        self.record(NetCall::Enable(params.ssid.to_string()));
        match self.enable_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn disable_ap(&mut self) -> Result<(), NetError> {
        self.record(NetCall::Disable);
        Ok(())
    }
}

// ── HTTP listener ─────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockServer {
    pub started: Arc<Mutex<Vec<u16>>>,
}

impl HttpServerPort for MockServer {
    fn start(&mut self, port: u16) -> Result<(), Error> {
        self.started.lock().unwrap().push(port);
        Ok(())
    }
}

// ── Clock ─────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct FixedClock(pub Arc<AtomicU32>);

#[allow(dead_code)]
impl FixedClock {
    pub fn set(&self, ms: u32) {
        self.0.store(ms, Ordering::Relaxed);
    }
}

impl Clock for FixedClock {
    fn uptime_ms(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

// ── Bus recorder ──────────────────────────────────────────────

/// Subscribe a recorder to `channel` and return its shared log.
pub fn record<M: Clone + Send + 'static>(channel: &Channel<M>) -> Arc<Mutex<Vec<M>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    channel
        .subscribe(move |msg: &M| sink.lock().unwrap().push(msg.clone()))
        .unwrap();
    log
}

// ── Fixture ───────────────────────────────────────────────────

pub struct Rig {
    pub app: App,
    pub leds: MockLeds,
    pub net: MockNetwork,
    pub clock: FixedClock,
}

#[allow(dead_code)]
pub fn rig() -> Rig {
    rig_with(SystemConfig::default(), MockNetwork::default())
}

pub fn rig_with(config: SystemConfig, net: MockNetwork) -> Rig {
    let leds = MockLeds::default();
    let clock = FixedClock::default();
    let app = App::new(
        config,
        Arc::new(clock.clone()),
        Box::new(leds.clone()),
        Box::new(net.clone()),
    )
    .unwrap();
    Rig {
        app,
        leds,
        net,
        clock,
    }
}
