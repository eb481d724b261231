//! Application core: the modules that own the state machines.
//!
//! Each module owns its machine arena, a single-consumer input queue where
//! a driver feeds it, and the effects of its transitions.  All interaction
//! with hardware happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod button;
pub mod gateway;
pub mod led;
pub mod ports;
pub mod service;
pub mod softap;

pub use service::App;
