//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises the composed app
//! against mock adapters.  All tests run on the host with no real
//! hardware required.

mod gateway_launch_tests;
mod mock_hw;
mod panel_flow_tests;
