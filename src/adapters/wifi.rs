//! WiFi SoftAP adapter.
//!
//! Implements [`NetworkPort`], the hexagonal boundary for the radio, and
//! turns driver events into [`NetEvent`]s delivered through an
//! [`EventRelay`] to whoever connected to it (the [`App`](crate::app::App)).
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation that confirms enable requests from a
//!   helper thread after a short delay, for host-side runs.
//!
//! ## Event flow
//!
//! ```text
//!   esp event loop ──WifiEvent──▶ EventRelay::emit ──▶ App::on_net_event
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use log::{info, warn};

use crate::app::ports::NetworkPort;
use crate::config::{ApConfig, ApSecurity};
use crate::error::NetError;
use crate::network::NetEvent;

// ───────────────────────────────────────────────────────────────
// Event relay
// ───────────────────────────────────────────────────────────────

type Handler = Arc<dyn Fn(NetEvent) + Send + Sync>;

/// Late-bound event target.  The adapter is built (and moved into the
/// app) before the app exists; the relay is connected afterwards.
#[derive(Clone, Default)]
pub struct EventRelay {
    handler: Arc<Mutex<Option<Handler>>>,
}

impl EventRelay {
    pub fn connect<F>(&self, handler: F)
    where
        F: Fn(NetEvent) + Send + Sync + 'static,
    {
        *self.slot() = Some(Arc::new(handler));
    }

    /// Deliver one event.  The handler runs outside the relay lock so it
    /// may call back into the adapter.
    pub fn emit(&self, event: NetEvent) {
        let handler = self.slot().clone();
        match handler {
            Some(h) => h(event),
            None => warn!("WiFi: {:?} dropped, relay not connected", event),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Handler>> {
        self.handler.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ───────────────────────────────────────────────────────────────
// WiFi AP adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiApAdapter {
    relay: EventRelay,
    enabled: bool,
    #[cfg(target_os = "espidf")]
    wifi: Option<esp_idf_svc::wifi::EspWifi<'static>>,
    #[cfg(target_os = "espidf")]
    _subscription: Option<esp_idf_svc::eventloop::EspSubscription<'static, esp_idf_svc::eventloop::System>>,
    /// Simulation: enable result delivered after the request.
    #[cfg(not(target_os = "espidf"))]
    sim_result: i32,
}

impl WifiApAdapter {
    pub fn relay(&self) -> EventRelay {
        self.relay.clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    pub fn new(
        wifi: Option<esp_idf_svc::wifi::EspWifi<'static>>,
        sysloop: &esp_idf_svc::eventloop::EspSystemEventLoop,
    ) -> Result<Self, crate::error::Error> {
        use esp_idf_svc::wifi::WifiEvent;

        let relay = EventRelay::default();
        let sink = relay.clone();
        let subscription = sysloop
            .subscribe::<WifiEvent, _>(move |event| {
                let net = match event {
                    WifiEvent::ApStarted => NetEvent::ApEnableResult(0),
                    WifiEvent::ApStopped => NetEvent::InterfaceDown,
                    WifiEvent::ApStaConnected(sta) => NetEvent::StationConnected(sta.mac()),
                    WifiEvent::ApStaDisconnected(sta) => NetEvent::StationDisconnected(sta.mac()),
                    _ => return,
                };
                sink.emit(net);
            })
            .map_err(|_| crate::error::Error::Init("WiFi event subscription"))?;

        Ok(Self {
            relay,
            enabled: false,
            wifi,
            _subscription: Some(subscription),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self::with_sim_result(0)
    }

    /// Simulated adapter whose enable request resolves with `code`.
    #[cfg(not(target_os = "espidf"))]
    pub fn with_sim_result(code: i32) -> Self {
        Self {
            relay: EventRelay::default(),
            enabled: false,
            sim_result: code,
        }
    }

    #[cfg(target_os = "espidf")]
    fn platform_enable(&mut self, params: &ApConfig) -> Result<(), NetError> {
        use esp_idf_svc::wifi::{AccessPointConfiguration, AuthMethod, Configuration};

        let wifi = self.wifi.as_mut().ok_or(NetError::NoDevice)?;
        let auth_method = match params.security {
            ApSecurity::Open => AuthMethod::None,
            ApSecurity::Wpa2Psk => AuthMethod::WPA2Personal,
        };
        let conf = Configuration::AccessPoint(AccessPointConfiguration {
            ssid: params.ssid.as_str().try_into().map_err(|_| NetError::Failed(-22))?,
            password: params.password.as_str().try_into().map_err(|_| NetError::Failed(-22))?,
            channel: params.channel,
            auth_method,
            ..Default::default()
        });
        wifi.set_configuration(&conf)
            .map_err(|e| NetError::Failed(e.code()))?;
        wifi.start().map_err(|e| NetError::Failed(e.code()))
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_enable(&mut self, params: &ApConfig) -> Result<(), NetError> {
        let relay = self.relay.clone();
        let code = self.sim_result;
        let open = params.security == ApSecurity::Open;
        info!("WiFi(sim): AP '{}' requested (open={})", params.ssid, open);
        // Confirmation arrives asynchronously, as on the real driver.
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            if code == 0 {
                relay.emit(NetEvent::InterfaceUp);
            }
            relay.emit(NetEvent::ApEnableResult(code));
        });
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_disable(&mut self) -> Result<(), NetError> {
        let wifi = self.wifi.as_mut().ok_or(NetError::NoDevice)?;
        wifi.stop().map_err(|e| NetError::Failed(e.code()))
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disable(&mut self) -> Result<(), NetError> {
        info!("WiFi(sim): AP disabled");
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_set_country(&mut self, country: &str) -> Result<(), NetError> {
        let mut cc = [0u8; 3];
        cc[..2].copy_from_slice(country.as_bytes().get(..2).ok_or(NetError::Failed(-22))?);
        // SAFETY: `cc` is a NUL-terminated two-letter code that outlives the call.
        let err = unsafe {
            esp_idf_svc::sys::esp_wifi_set_country_code(cc.as_ptr().cast(), true)
        };
        if err == esp_idf_svc::sys::ESP_OK {
            Ok(())
        } else {
            Err(NetError::Failed(err))
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_set_country(&mut self, country: &str) -> Result<(), NetError> {
        info!("WiFi(sim): regulatory domain {}", country);
        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiApAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkPort for WifiApAdapter {
    #[cfg(target_os = "espidf")]
    fn resolve_interface(&mut self) -> Result<(), NetError> {
        if self.wifi.is_some() { Ok(()) } else { Err(NetError::NoDevice) }
    }

    #[cfg(not(target_os = "espidf"))]
    fn resolve_interface(&mut self) -> Result<(), NetError> {
        Ok(())
    }

    fn set_regulatory_domain(&mut self, country: &str) -> Result<(), NetError> {
        self.platform_set_country(country)
    }

    fn start_dhcp_server(&mut self, pool_start: [u8; 4]) -> Result<(), NetError> {
        // The AP netif runs its own DHCP server from the moment it is
        // created; the pool follows the interface subnet.
        info!(
            "WiFi: DHCP leases from {}",
            crate::adapters::utils::ipv4(pool_start)
        );
        Err(NetError::AlreadyRunning)
    }

    fn enable_ap(&mut self, params: &ApConfig) -> Result<(), NetError> {
        if self.enabled {
            return Err(NetError::AlreadyRunning);
        }
        self.platform_enable(params)?;
        self.enabled = true;
        Ok(())
    }

    fn disable_ap(&mut self) -> Result<(), NetError> {
        if !self.enabled {
            return Ok(());
        }
        self.platform_disable()?;
        self.enabled = false;
        Ok(())
    }
}
