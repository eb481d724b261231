//! Typed publish/subscribe bus.
//!
//! A fixed set of channels, one message type each, constructed once at
//! startup and handed to every module that needs it (no global wiring).
//!
//! ```text
//!   producer ──publish──▶ Channel<M> ──▶ listener 0
//!                            │        ──▶ listener 1
//!                            │        ──▶ ...          (registration order)
//!                         guard (bounded wait)
//! ```
//!
//! Listeners run synchronously on the publisher's thread.  A listener may
//! publish on a *different* channel; publishing on the channel it is
//! being invoked from cannot acquire the guard and reports
//! [`BusError::Busy`] once the timeout lapses instead of recursing.

use core::time::Duration;
use std::sync::{Mutex, MutexGuard, TryLockError};
use std::time::Instant;

use crate::error::BusError;
use crate::messages::{ApMsg, ButtonMsg, LedCmdMsg, LedStateMsg};

/// Listener slots per channel.
pub const MAX_LISTENERS: usize = 4;

/// Bounded wait applied to control-path publishes (button events, LED commands).
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_millis(100);

type Listener<M> = Box<dyn Fn(&M) + Send + Sync>;

// ── Channel ───────────────────────────────────────────────────

pub struct Channel<M> {
    name: &'static str,
    listeners: Mutex<heapless::Vec<Listener<M>, MAX_LISTENERS>>,
}

impl<M> Channel<M> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            listeners: Mutex::new(heapless::Vec::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Register a listener for the lifetime of the process.
    pub fn subscribe<F>(&self, listener: F) -> Result<(), BusError>
    where
        F: Fn(&M) + Send + Sync + 'static,
    {
        let mut listeners = self.lock_blocking();
        listeners
            .push(Box::new(listener))
            .map_err(|_| BusError::ListenersFull)
    }

    pub fn listener_count(&self) -> usize {
        self.lock_blocking().len()
    }

    /// Deliver `msg` to every listener, in registration order.
    ///
    /// Returns the number of listeners invoked.  Fails with `Busy` if the
    /// channel guard is not acquired within `timeout`, or `Unavailable`
    /// when nothing has subscribed yet.
    pub fn try_publish(&self, msg: &M, timeout: Duration) -> Result<usize, BusError> {
        let listeners = self.acquire(timeout).ok_or(BusError::Busy)?;
        if listeners.is_empty() {
            return Err(BusError::Unavailable);
        }
        for listener in listeners.iter() {
            listener(msg);
        }
        Ok(listeners.len())
    }

    /// Fire-and-forget publish: an empty channel counts as zero deliveries.
    pub fn publish(&self, msg: &M, timeout: Duration) -> Result<usize, BusError> {
        match self.try_publish(msg, timeout) {
            Err(BusError::Unavailable) => Ok(0),
            other => other,
        }
    }

    fn acquire(
        &self,
        timeout: Duration,
    ) -> Option<MutexGuard<'_, heapless::Vec<Listener<M>, MAX_LISTENERS>>> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.listeners.try_lock() {
                Ok(guard) => return Some(guard),
                // A listener panicked mid-publish; the table itself is intact.
                Err(TryLockError::Poisoned(p)) => return Some(p.into_inner()),
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        return None;
                    }
                    std::thread::yield_now();
                }
            }
        }
    }

    fn lock_blocking(&self) -> MutexGuard<'_, heapless::Vec<Listener<M>, MAX_LISTENERS>> {
        self.listeners
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

// ── Bus ───────────────────────────────────────────────────────

/// The complete channel set.  Share it behind an `Arc`.
pub struct Bus {
    pub button: Channel<ButtonMsg>,
    pub led_cmd: Channel<LedCmdMsg>,
    pub led_state: Channel<LedStateMsg>,
    pub ap: Channel<ApMsg>,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    pub fn new() -> Self {
        Self {
            button: Channel::new("button"),
            led_cmd: Channel::new("led_cmd"),
            led_state: Channel::new("led_state"),
            ap: Channel::new("softap"),
        }
    }
}
