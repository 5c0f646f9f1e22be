//! Hardware Abstraction Layer for the counter controller

// Re-export time types based on feature
#[cfg(feature = "embassy-time")]
pub use embassy_time::Duration;

#[cfg(not(feature = "embassy-time"))]
pub use self::mock_time::Duration;

#[cfg(not(feature = "embassy-time"))]
mod mock_time {
    /// Duration stand-in for builds without embassy-time
    #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
    pub struct Duration(u64);

    impl Duration {
        pub const fn from_micros(us: u64) -> Self {
            Self(us)
        }

        pub const fn from_millis(ms: u64) -> Self {
            Self(ms * 1_000)
        }

        pub const fn as_micros(&self) -> u64 {
            self.0
        }

        pub const fn as_millis(&self) -> u64 {
            self.0 / 1_000
        }
    }

    impl core::ops::Mul<u32> for Duration {
        type Output = Duration;

        fn mul(self, rhs: u32) -> Duration {
            Duration(self.0 * rhs as u64)
        }
    }
}

use embedded_hal::digital::{InputPin, OutputPin};

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// GPIO operation failed
    GpioError,
    /// Timer operation failed
    TimerError,
    /// Interrupt configuration failed
    InterruptError,
    /// Hardware not initialized
    NotInitialized,
    /// Invalid configuration
    InvalidConfig,
}

#[cfg(feature = "std")]
impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::GpioError => write!(f, "GPIO operation failed"),
            HalError::TimerError => write!(f, "Timer operation failed"),
            HalError::InterruptError => write!(f, "Interrupt configuration failed"),
            HalError::NotInitialized => write!(f, "Hardware not initialized"),
            HalError::InvalidConfig => write!(f, "Invalid configuration"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Interrupt sources the controller registers
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrqSource {
    /// Button bus edge interrupt
    Buttons,
    /// Periodic timer expiration
    Timer,
}

/// Button bus with its edge interrupt
pub trait ButtonPort {
    /// Read the current raw button value
    fn read(&mut self) -> Result<u32, HalError>;

    /// Unmask the edge interrupt
    fn enable_interrupt(&mut self) -> Result<(), HalError>;

    /// Mask the edge interrupt
    fn disable_interrupt(&mut self) -> Result<(), HalError>;

    /// Acknowledge a latched edge
    fn clear_interrupt(&mut self) -> Result<(), HalError>;

    /// True when the latched status belongs to this bus
    fn interrupt_pending(&mut self) -> Result<bool, HalError>;
}

/// Display output bus
pub trait DisplayPort {
    fn write(&mut self, value: u32) -> Result<(), HalError>;
}

/// Mode-select input bus
pub trait SwitchPort {
    fn read(&mut self) -> Result<u32, HalError>;
}

/// Periodic hardware timer
pub trait TickTimer {
    /// Program the load value, auto-reload and interrupt mode
    fn configure(&mut self, load: u32) -> Result<(), HalError>;

    fn start(&mut self) -> Result<(), HalError>;

    fn stop(&mut self) -> Result<(), HalError>;

    /// Reload the counter from the load value and acknowledge the expiration
    fn reset(&mut self) -> Result<(), HalError>;

    /// True when the timer has expired since the last reset
    fn is_expired(&mut self) -> Result<bool, HalError>;
}

/// Interrupt controller
pub trait InterruptController {
    fn enable_source(&mut self, source: IrqSource) -> Result<(), HalError>;

    fn disable_source(&mut self, source: IrqSource) -> Result<(), HalError>;

    /// Enable interrupt delivery to the core
    fn global_enable(&mut self) -> Result<(), HalError>;
}

/// Device handles used by the handlers and the mode poller
pub struct Peripherals<B, D, S, T> {
    pub buttons: B,
    pub display: D,
    pub switches: S,
    pub timer: T,
}

impl<B, D, S, T> Peripherals<B, D, S, T>
where
    B: ButtonPort,
    D: DisplayPort,
    S: SwitchPort,
    T: TickTimer,
{
    pub fn new(buttons: B, display: D, switches: S, timer: T) -> Self {
        Self {
            buttons,
            display,
            switches,
            timer,
        }
    }
}

/// Parallel bus assembled from embedded-hal pins, pin `i` carrying bit `i`
pub struct PinBus<P, const N: usize> {
    pins: [P; N],
}

impl<P, const N: usize> PinBus<P, N> {
    pub fn new(pins: [P; N]) -> Self {
        Self { pins }
    }

    /// Release the pins
    pub fn free(self) -> [P; N] {
        self.pins
    }
}

impl<P, const N: usize> DisplayPort for PinBus<P, N>
where
    P: OutputPin,
{
    fn write(&mut self, value: u32) -> Result<(), HalError> {
        for (bit, pin) in self.pins.iter_mut().enumerate() {
            let result = if value & (1 << bit) != 0 {
                pin.set_high()
            } else {
                pin.set_low()
            };
            result.map_err(|_| HalError::GpioError)?;
        }
        Ok(())
    }
}

impl<P, const N: usize> SwitchPort for PinBus<P, N>
where
    P: InputPin,
{
    fn read(&mut self) -> Result<u32, HalError> {
        let mut value = 0;
        for (bit, pin) in self.pins.iter_mut().enumerate() {
            if pin.is_high().map_err(|_| HalError::GpioError)? {
                value |= 1 << bit;
            }
        }
        Ok(value)
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    use super::*;
    use heapless::Vec;

    /// Button bus that latches edge status the way AXI GPIO does
    #[derive(Default, Debug)]
    pub struct MockButtons {
        value: u32,
        pending: bool,
        enabled: bool,
        /// Force `interrupt_pending` to report a foreign source
        foreign: bool,
        clears: u32,
        /// Fail every `read`
        pub fail_read: bool,
    }

    impl MockButtons {
        pub fn new() -> Self {
            Self::default()
        }

        /// Change the bus value, latching an edge
        pub fn set_value(&mut self, value: u32) {
            if value != self.value {
                self.pending = true;
            }
            self.value = value;
        }

        /// Latch an edge that the status register attributes to another source
        pub fn latch_foreign(&mut self) {
            self.foreign = true;
            self.pending = true;
        }

        pub fn value(&self) -> u32 {
            self.value
        }

        pub fn is_enabled(&self) -> bool {
            self.enabled
        }

        pub fn is_pending(&self) -> bool {
            self.pending
        }

        /// True when the hardware would raise the interrupt line
        pub fn should_fire(&self) -> bool {
            self.enabled && self.pending
        }

        pub fn clear_count(&self) -> u32 {
            self.clears
        }
    }

    impl ButtonPort for MockButtons {
        fn read(&mut self) -> Result<u32, HalError> {
            if self.fail_read {
                return Err(HalError::GpioError);
            }
            Ok(self.value)
        }

        fn enable_interrupt(&mut self) -> Result<(), HalError> {
            self.enabled = true;
            Ok(())
        }

        fn disable_interrupt(&mut self) -> Result<(), HalError> {
            self.enabled = false;
            Ok(())
        }

        fn clear_interrupt(&mut self) -> Result<(), HalError> {
            self.pending = false;
            self.foreign = false;
            self.clears += 1;
            Ok(())
        }

        fn interrupt_pending(&mut self) -> Result<bool, HalError> {
            Ok(self.pending && !self.foreign)
        }
    }

    /// Display that records every write
    #[derive(Default, Debug)]
    pub struct MockDisplay {
        writes: Vec<u32, 64>,
        overflowed: bool,
    }

    impl MockDisplay {
        pub fn new() -> Self {
            Self::default()
        }

        /// Most recent value written
        pub fn shown(&self) -> Option<u32> {
            self.writes.last().copied()
        }

        pub fn writes(&self) -> &[u32] {
            &self.writes
        }

        /// True when more writes happened than the log holds
        pub fn overflowed(&self) -> bool {
            self.overflowed
        }

        pub fn clear(&mut self) {
            self.writes.clear();
            self.overflowed = false;
        }
    }

    impl DisplayPort for MockDisplay {
        fn write(&mut self, value: u32) -> Result<(), HalError> {
            if self.writes.is_full() {
                self.writes.remove(0);
                self.overflowed = true;
            }
            self.writes.push(value).map_err(|_| HalError::GpioError)
        }
    }

    /// Display whose writes always fail
    #[derive(Default, Debug)]
    pub struct FailingDisplay;

    impl DisplayPort for FailingDisplay {
        fn write(&mut self, _value: u32) -> Result<(), HalError> {
            Err(HalError::GpioError)
        }
    }

    #[derive(Default, Debug)]
    pub struct MockSwitches {
        value: u32,
    }

    impl MockSwitches {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set(&mut self, value: u32) {
            self.value = value;
        }
    }

    impl SwitchPort for MockSwitches {
        fn read(&mut self) -> Result<u32, HalError> {
            Ok(self.value)
        }
    }

    /// Control operation recorded by [`MockTimer`]
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum TimerOp {
        Configure,
        Start,
        Stop,
        Reset,
    }

    /// Timer with an explicit expiration latch
    #[derive(Default, Debug)]
    pub struct MockTimer {
        load: Option<u32>,
        running: bool,
        expired: bool,
        restarts: u32,
        ops: Vec<TimerOp, 32>,
    }

    impl MockTimer {
        pub fn new() -> Self {
            Self::default()
        }

        /// Latch an expiration
        pub fn expire(&mut self) {
            self.expired = true;
        }

        pub fn load(&self) -> Option<u32> {
            self.load
        }

        pub fn is_running(&self) -> bool {
            self.running
        }

        /// Number of reset + start sequences
        pub fn restarts(&self) -> u32 {
            self.restarts
        }

        /// Most recent control operations, oldest first
        pub fn ops(&self) -> &[TimerOp] {
            &self.ops
        }

        fn record(&mut self, op: TimerOp) {
            if self.ops.is_full() {
                self.ops.remove(0);
            }
            let _ = self.ops.push(op);
        }
    }

    impl TickTimer for MockTimer {
        fn configure(&mut self, load: u32) -> Result<(), HalError> {
            self.record(TimerOp::Configure);
            self.load = Some(load);
            Ok(())
        }

        fn start(&mut self) -> Result<(), HalError> {
            if self.load.is_none() {
                return Err(HalError::NotInitialized);
            }
            self.record(TimerOp::Start);
            self.running = true;
            Ok(())
        }

        fn stop(&mut self) -> Result<(), HalError> {
            self.record(TimerOp::Stop);
            self.running = false;
            Ok(())
        }

        fn reset(&mut self) -> Result<(), HalError> {
            self.record(TimerOp::Reset);
            self.expired = false;
            self.restarts += 1;
            Ok(())
        }

        fn is_expired(&mut self) -> Result<bool, HalError> {
            Ok(self.expired)
        }
    }

    #[derive(Default, Debug)]
    pub struct MockInterruptController {
        buttons: bool,
        timer: bool,
        global: bool,
        /// Fail `enable_source` to simulate a broken controller
        pub fail_enable: bool,
    }

    impl MockInterruptController {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn is_source_enabled(&self, source: IrqSource) -> bool {
            match source {
                IrqSource::Buttons => self.buttons,
                IrqSource::Timer => self.timer,
            }
        }

        pub fn is_global_enabled(&self) -> bool {
            self.global
        }
    }

    impl InterruptController for MockInterruptController {
        fn enable_source(&mut self, source: IrqSource) -> Result<(), HalError> {
            if self.fail_enable {
                return Err(HalError::InterruptError);
            }
            match source {
                IrqSource::Buttons => self.buttons = true,
                IrqSource::Timer => self.timer = true,
            }
            Ok(())
        }

        fn disable_source(&mut self, source: IrqSource) -> Result<(), HalError> {
            match source {
                IrqSource::Buttons => self.buttons = false,
                IrqSource::Timer => self.timer = false,
            }
            Ok(())
        }

        fn global_enable(&mut self) -> Result<(), HalError> {
            self.global = true;
            Ok(())
        }
    }

    /// Peripheral bundle built from mocks
    pub type MockPeripherals = Peripherals<MockButtons, MockDisplay, MockSwitches, MockTimer>;

    pub fn mock_peripherals() -> MockPeripherals {
        Peripherals::new(
            MockButtons::new(),
            MockDisplay::new(),
            MockSwitches::new(),
            MockTimer::new(),
        )
    }
}
