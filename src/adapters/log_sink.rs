//! Log-based bus tap.
//!
//! Subscribes to every channel and writes one structured line per message
//! to the ESP-IDF logger (UART / USB-CDC in production, stderr on host).

use std::sync::Arc;

use log::info;

use crate::board::BoardLayout;
use crate::bus::Bus;
use crate::error::BusError;
use crate::messages::{ApEventKind, Mac};

/// Registers a logging listener on each bus channel.
pub struct LogTap;

impl LogTap {
    pub fn attach(bus: &Bus, board: &BoardLayout) -> Result<(), BusError> {
        let labels = Arc::new(board.clone());

        let b = labels.clone();
        bus.button.subscribe(move |m| {
            info!(
                "BUTTON | {} {:?} | count={} t={}ms",
                b.button_label(m.button),
                m.action,
                m.press_count,
                m.timestamp_ms,
            );
        })?;

        let b = labels.clone();
        bus.led_cmd.subscribe(move |m| {
            info!("LED CMD | {} {}", b.led_label(m.led), m.action);
        })?;

        let b = labels;
        bus.led_state.subscribe(move |m| {
            info!(
                "LED | {} is {}",
                b.led_label(m.led),
                if m.on { "ON" } else { "OFF" }
            );
        })?;

        bus.ap.subscribe(|m| match m.kind {
            ApEventKind::Started => info!("SOFTAP | started ssid='{}' ch={}", m.ssid, m.channel),
            ApEventKind::Stopped => info!("SOFTAP | stopped"),
            ApEventKind::ClientConnected(mac) => info!("SOFTAP | client joined {}", Mac(&mac)),
            ApEventKind::ClientDisconnected(mac) => info!("SOFTAP | client left {}", Mac(&mac)),
            ApEventKind::Error => info!("SOFTAP | error code={}", m.error_code),
        })
    }
}
