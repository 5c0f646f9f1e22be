#![cfg_attr(not(feature = "std"), no_std)]

//! # Counter Core
//!
//! Interrupt-driven counter controller for embedded systems.
//! A periodic timer advances a display count and debounces an increment button
//! purely from ticks; a button edge interrupt applies presses; a cooperative
//! poller reads mode-select switches.

pub mod types;
pub mod debounce;
pub mod controller;
pub mod mode;
pub mod startup;
pub mod hal;

#[cfg(feature = "test-utils")]
pub mod test_utils;


pub use types::*;
pub use debounce::*;
pub use controller::*;
pub use mode::*;
pub use startup::bring_up;
pub use hal::{*, Duration};

/// Counter library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration for the reference board: threshold 3 of 7, scale 8
pub fn default_config() -> CounterConfig {
    CounterConfig::default()
}
