//! Memory map and interrupt wiring of the FPGA design

/// AXI GPIO carrying the four push buttons
pub const BUTTONS_BASE: usize = 0x4120_0000;
/// AXI GPIO driving the four LEDs
pub const LEDS_BASE: usize = 0x4121_0000;
/// AXI GPIO reading the four slide switches
pub const SWITCHES_BASE: usize = 0x4122_0000;
/// AXI timer/counter
pub const TIMER_BASE: usize = 0x4280_0000;
/// Platform-level interrupt controller
pub const PLIC_BASE: usize = 0x0C00_0000;

/// PLIC source id of the button GPIO interrupt line
pub const BUTTONS_IRQ: u32 = 1;
/// PLIC source id of the timer interrupt line
pub const TIMER_IRQ: u32 = 2;

/// AXI timer input clock
pub const TIMER_CLOCK_HZ: u32 = 100_000_000;

/// Width of each GPIO bus
pub const BUS_WIDTH: u8 = 4;
