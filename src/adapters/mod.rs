//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements      | Connects to                    |
//! |-------------|-----------------|--------------------------------|
//! | `hardware`  | LedOutput       | GPIO outputs (embedded-hal)    |
//! |             | (button scan)   | GPIO inputs (embedded-hal)     |
//! | `http`      | HttpServerPort  | ESP-IDF HTTP server            |
//! | `log_sink`  | bus listeners   | Serial log output              |
//! | `time`      | Clock           | ESP32 system timer             |
//! | `wifi`      | NetworkPort     | ESP-IDF WiFi SoftAP            |

pub mod hardware;
pub mod http;
pub mod log_sink;
pub mod time;
pub(crate) mod utils;
pub mod wifi;
