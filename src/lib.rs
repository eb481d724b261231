//! SoftAP control panel library.
//!
//! Button input drives LED output and a SoftAP lifecycle; an HTTP gateway
//! exposes and controls the same state.  Everything meets on a typed
//! message bus.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module, so the whole core
//! is testable on the host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod board;
pub mod bus;
pub mod config;
pub mod error;
pub mod fsm;
pub mod messages;
pub mod network;
pub mod pins;
mod rt;
