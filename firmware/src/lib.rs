#![no_std]

//! Board support for the counter controller
//!
//! Drivers for the AXI GPIO, AXI timer and PLIC blocks of the soft-core design,
//! plus the glue that shares one `CounterController` between the interrupt
//! handlers and the mode-poll loop.

#[macro_use]
mod log;

mod critical;

pub mod app;
pub mod axi_gpio;
pub mod axi_timer;
pub mod board;
pub mod plic;

pub use counter_core;
