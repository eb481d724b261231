//! System configuration parameters
//!
//! All tunable parameters for the control panel: board layout, SoftAP
//! credentials and addressing, HTTP listener, timing.  Defaults match the
//! reference dev kit; a JSON document can override any subset of fields.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::adapters::utils::is_printable_ascii;
use crate::board::BoardLayout;
use crate::error::Error;

/// Core system configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub board: BoardLayout,
    pub ap: ApConfig,
    pub http: HttpConfig,
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApSecurity {
    Open,
    Wpa2Psk,
}

/// SoftAP parameters handed to the network collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApConfig {
    pub ssid: heapless::String<32>,
    /// Empty for an open network, else 8–64 bytes.
    pub password: heapless::String<64>,
    /// 2.4 GHz channel, 1–13.
    pub channel: u8,
    pub security: ApSecurity,
    /// ISO 3166 alpha-2 regulatory domain.
    pub country_code: heapless::String<2>,
    /// Address of the AP interface itself.
    pub gateway: [u8; 4],
    /// First address leased by the DHCP server.
    pub dhcp_pool_start: [u8; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    /// Delay between the AP reporting `Started` and the listener opening.
    pub settle_delay_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Bounded wait for control-path publishes (button, LED command).
    pub publish_timeout_ms: u32,
    /// Control loop interval (draining module queues).
    pub tick_interval_ms: u32,
    /// Coarse SoftAP poll interval.
    pub ap_poll_interval_ms: u32,
    /// Delay after boot before the SoftAP start request.
    pub ap_start_delay_ms: u32,
}

impl Default for ApConfig {
    fn default() -> Self {
        let mut ssid = heapless::String::new();
        let _ = ssid.push_str("SoftAP-Panel");
        let mut password = heapless::String::new();
        let _ = password.push_str("panel-setup");
        let mut country_code = heapless::String::new();
        let _ = country_code.push_str("US");
        Self {
            ssid,
            password,
            channel: 1,
            security: ApSecurity::Wpa2Psk,
            country_code,
            gateway: [192, 168, 7, 1],
            dhcp_pool_start: [192, 168, 7, 2],
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 80,
            settle_delay_ms: 2000,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            publish_timeout_ms: 100,
            tick_interval_ms: 10,
            ap_poll_interval_ms: 1000,
            ap_start_delay_ms: 2000,
        }
    }
}

impl TimingConfig {
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.publish_timeout_ms))
    }
}

impl SystemConfig {
    /// Parse a JSON override document and validate the result.
    pub fn from_json(bytes: &[u8]) -> Result<Self, Error> {
        let config: Self =
            serde_json::from_slice(bytes).map_err(|_| Error::Config("invalid JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the firmware cannot operate with.  Nothing is clamped.
    pub fn validate(&self) -> Result<(), Error> {
        if self.board.button_count() == 0 && self.board.led_count() == 0 {
            return Err(Error::Config("board declares no buttons or LEDs"));
        }
        self.ap.validate()?;
        if self.http.port == 0 {
            return Err(Error::Config("HTTP port must be non-zero"));
        }
        if self.timing.tick_interval_ms == 0 || self.timing.ap_poll_interval_ms == 0 {
            return Err(Error::Config("loop intervals must be non-zero"));
        }
        Ok(())
    }
}

impl ApConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.ssid.is_empty() || !is_printable_ascii(&self.ssid) {
            return Err(Error::Config("SSID must be 1-32 printable ASCII bytes"));
        }
        match (self.security, self.password.len()) {
            (ApSecurity::Open, 0) => {}
            (ApSecurity::Open, _) => {
                return Err(Error::Config("open network must not carry a password"));
            }
            (ApSecurity::Wpa2Psk, 8..=64) => {}
            (ApSecurity::Wpa2Psk, _) => {
                return Err(Error::Config("WPA2 password must be 8-64 bytes"));
            }
        }
        if !(1..=13).contains(&self.channel) {
            return Err(Error::Config("channel must be 1-13"));
        }
        if self.country_code.len() != 2
            || !self.country_code.bytes().all(|b| b.is_ascii_uppercase())
        {
            return Err(Error::Config("country code must be two uppercase letters"));
        }
        if self.dhcp_pool_start == self.gateway {
            return Err(Error::Config("DHCP pool must not start at the gateway address"));
        }
        Ok(())
    }
}
