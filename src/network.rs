//! Network-management event tracking.
//!
//! The radio adapter delivers [`NetEvent`]s from its own callback context.
//! [`NetworkMonitor`] keeps the table of associated stations and raises a
//! binary signal for each event class so other threads can block, with a
//! bound, until the interface is up, the AP is ready, or a station joins.
//!
//! ```text
//!   radio callback ──▶ NetEvent ──▶ NetworkMonitor ──▶ station table
//!                                        │            (lock per mutation)
//!                                        └──▶ Signal ──▶ wait_for_*(timeout)
//! ```

use core::time::Duration;
use std::sync::Mutex;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use futures_lite::future;
use log::{debug, error, info, warn};

use crate::error::NetError;
use crate::messages::{Mac, MacAddr};

/// Station slots tracked while the AP is up.
pub const MAX_STATIONS: usize = 4;

/// Events the network-management collaborator delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetEvent {
    InterfaceUp,
    InterfaceDown,
    /// Outcome of an AP enable request; 0 = success.
    ApEnableResult(i32),
    StationConnected(MacAddr),
    StationDisconnected(MacAddr),
}

pub struct NetworkMonitor {
    iface_up: Signal<CriticalSectionRawMutex, ()>,
    softap_ready: Signal<CriticalSectionRawMutex, ()>,
    station_connected: Signal<CriticalSectionRawMutex, MacAddr>,
    stations: Mutex<[Option<MacAddr>; MAX_STATIONS]>,
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkMonitor {
    pub const fn new() -> Self {
        Self {
            iface_up: Signal::new(),
            softap_ready: Signal::new(),
            station_connected: Signal::new(),
            stations: Mutex::new([None; MAX_STATIONS]),
        }
    }

    /// Record one event.  Never blocks beyond the station-table lock.
    pub fn handle(&self, event: &NetEvent) {
        match *event {
            NetEvent::InterfaceUp => {
                info!("Network: interface up");
                self.iface_up.signal(());
            }
            NetEvent::InterfaceDown => {
                info!("Network: interface down");
                self.clear_stations();
            }
            NetEvent::ApEnableResult(0) => {
                info!("Network: SoftAP enabled");
                self.softap_ready.signal(());
            }
            NetEvent::ApEnableResult(code) => {
                error!("Network: SoftAP enable failed ({})", code);
            }
            NetEvent::StationConnected(mac) => {
                info!("Network: station connected {}", Mac(&mac));
                match self.insert_station(mac) {
                    Some(slot) => debug!("Network: station stored in slot {}", slot),
                    None => warn!("Network: station table full, {} not tracked", Mac(&mac)),
                }
                self.station_connected.signal(mac);
            }
            NetEvent::StationDisconnected(mac) => {
                info!("Network: station disconnected {}", Mac(&mac));
                self.remove_station(&mac);
            }
        }
    }

    /// Stations currently associated, in slot order.
    pub fn connected_stations(&self) -> heapless::Vec<MacAddr, MAX_STATIONS> {
        self.table().iter().flatten().copied().collect()
    }

    pub fn station_count(&self) -> usize {
        self.table().iter().flatten().count()
    }

    pub fn wait_for_iface_up(&self, timeout: Duration) -> Result<(), NetError> {
        block_with_timeout(self.iface_up.wait(), timeout)
    }

    pub fn wait_for_softap_ready(&self, timeout: Duration) -> Result<(), NetError> {
        block_with_timeout(self.softap_ready.wait(), timeout)
    }

    /// Blocks until a station associates.  Returns its MAC.
    pub fn wait_for_station_connected(&self, timeout: Duration) -> Result<MacAddr, NetError> {
        block_with_timeout(self.station_connected.wait(), timeout)
    }

    fn insert_station(&self, mac: MacAddr) -> Option<usize> {
        let mut table = self.table();
        if let Some(slot) = table.iter().position(|s| *s == Some(mac)) {
            return Some(slot);
        }
        let slot = table.iter().position(Option::is_none)?;
        table[slot] = Some(mac);
        Some(slot)
    }

    fn remove_station(&self, mac: &MacAddr) {
        let mut table = self.table();
        if let Some(slot) = table.iter_mut().find(|s| s.as_ref() == Some(mac)) {
            *slot = None;
        }
    }

    fn clear_stations(&self) {
        *self.table() = [None; MAX_STATIONS];
    }

    fn table(&self) -> std::sync::MutexGuard<'_, [Option<MacAddr>; MAX_STATIONS]> {
        self.stations
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Drive `fut` on the current thread, giving up after `timeout`.
fn block_with_timeout<T>(fut: impl Future<Output = T>, timeout: Duration) -> Result<T, NetError> {
    future::block_on(future::or(async { Ok(fut.await) }, async {
        async_io_mini::Timer::after(timeout).await;
        Err(NetError::Timeout)
    }))
}
