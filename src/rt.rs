//! Time driver symbols for the embassy timer stack.
//!
//! `embassy-time-driver` resolves `_embassy_time_now` and
//! `_embassy_time_schedule_wake` at link time; the `async-io-mini` timers
//! behind the network waits need both.  Ticks are microseconds (the
//! driver's default rate).
//!
//! - **`target_os = "espidf"`**: time from `esp_timer_get_time()`.
//! - **all other targets**: time since first use of the driver.

use core::task::Waker;
use core::time::Duration;

#[cfg(target_os = "espidf")]
#[unsafe(no_mangle)]
fn _embassy_time_now() -> u64 {
    // SAFETY: plain read of the monotonic high-resolution timer.
    (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
}

#[cfg(not(target_os = "espidf"))]
#[unsafe(no_mangle)]
fn _embassy_time_now() -> u64 {
    static EPOCH: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
    EPOCH.get_or_init(std::time::Instant::now).elapsed().as_micros() as u64
}

/// Wake `waker` once the tick counter reaches `at`.  Each registration
/// gets a short-lived sleeper thread; waits here are rare and coarse.
#[unsafe(no_mangle)]
fn _embassy_time_schedule_wake(at: u64, waker: &Waker) {
    let waker = waker.clone();
    let spawned = std::thread::Builder::new()
        .name("time-wake".into())
        .stack_size(4 * 1024)
        .spawn(move || {
            let now = _embassy_time_now();
            if at > now {
                std::thread::sleep(Duration::from_micros(at - now));
            }
            waker.wake();
        });
    if let Err(e) = spawned {
        log::error!("Timer: wake thread not spawned: {}", e);
    }
}
