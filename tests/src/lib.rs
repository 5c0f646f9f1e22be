//! Host-side integration tests for the counter controller
//!
//! Everything here runs against the simulated board in `counter_core::test_utils`
//! or against `embedded-hal-mock` pins; nothing needs the target.

mod scenario_tests;
