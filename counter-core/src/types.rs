//! Core data types and configuration for the counter controller

use portable_atomic::{AtomicBool, Ordering};

use crate::hal::Duration;

/// Threshold loaded at startup and after a disable-buttons reset
pub const DEFAULT_THRESHOLD: u32 = 3;
/// Highest threshold a debounced press may reach
pub const MAX_THRESHOLD: u32 = 7;
/// Ticks per threshold unit
pub const SCALE_FACTOR: u32 = 8;

/// Button value requesting a threshold increase
pub const INCREMENT_BUTTON: u32 = 0b0010;
/// Button value that clears the display count
pub const RESET_BUTTON: u32 = 0b0001;

/// Mode-select bit that disables the buttons
pub const SWITCH_DISABLE_BUTTONS: u32 = 0b0001;
/// Mode-select bits that enable the increment button
pub const SWITCH_ENABLE_INCREMENT: u32 = 0b0010;

/// Number of LEDs on the display bus
pub const DISPLAY_WIDTH_BITS: u8 = 4;

/// Count-up timer load value, ~0.248 s between expirations on the reference clock
pub const DEFAULT_TIMER_LOAD: u32 = 0xFEDB_6DB7;

/// What happens when the increment button is released while a press is being debounced
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReleasePolicy {
    /// Drop back to idle and re-arm the button interrupt
    Cancel,
    /// Stay in debouncing until the button is observed held on a later tick
    Retain,
}

/// Effect of a raw button value that does not start a debounce
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ButtonAction {
    /// Clear the display count
    Reset,
    /// Add the raw value to the display count
    Add(u32),
}

/// Configuration validation errors
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Default threshold must be at least 1
    ZeroThreshold,
    /// Maximum threshold is below the default
    ThresholdRange,
    /// Scale factor must be at least 2
    ScaleTooSmall,
    /// `max_threshold * scale` does not fit in a tick counter
    TickOverflow,
    /// Display width must be 1..=32 bits
    DisplayWidth,
    /// Increment button value is zero or collides with the reset value
    ButtonEncoding,
    /// A mode-select mask is empty
    SwitchMask,
    /// Timer load leaves no cycles before overflow, or the clock is zero
    TimerLoad,
}

#[cfg(feature = "std")]
impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroThreshold => write!(f, "default threshold must be at least 1"),
            ConfigError::ThresholdRange => write!(f, "maximum threshold is below the default"),
            ConfigError::ScaleTooSmall => write!(f, "scale factor must be at least 2"),
            ConfigError::TickOverflow => write!(f, "max threshold times scale overflows the tick counter"),
            ConfigError::DisplayWidth => write!(f, "display width must be between 1 and 32 bits"),
            ConfigError::ButtonEncoding => write!(f, "invalid increment/reset button encoding"),
            ConfigError::SwitchMask => write!(f, "mode-select masks must be non-zero"),
            ConfigError::TimerLoad => write!(f, "timer load or clock yields no tick period"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Counter controller configuration
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CounterConfig {
    /// Threshold at startup and after a reset
    pub default_threshold: u32,
    /// Inclusive upper bound for the threshold
    pub max_threshold: u32,
    /// Ticks per threshold unit
    pub scale: u32,
    /// Raw button value that requests a threshold increase
    pub increment_button: u32,
    /// Raw button value that clears the display, if any
    pub reset_button: Option<u32>,
    /// Display count wraps modulo `2^display_width_bits`
    pub display_width_bits: u8,
    /// Release handling while debouncing
    pub release_policy: ReleasePolicy,
    /// Load register value for the periodic timer
    pub timer_load: u32,
    /// Mode-select mask that disables the buttons
    pub disable_buttons_switch: u32,
    /// Mode-select mask controlling the increment button
    pub enable_increment_switch: u32,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            default_threshold: DEFAULT_THRESHOLD,
            max_threshold: MAX_THRESHOLD,
            scale: SCALE_FACTOR,
            increment_button: INCREMENT_BUTTON,
            reset_button: Some(RESET_BUTTON),
            display_width_bits: DISPLAY_WIDTH_BITS,
            release_policy: ReleasePolicy::Cancel,
            timer_load: DEFAULT_TIMER_LOAD,
            disable_buttons_switch: SWITCH_DISABLE_BUTTONS,
            enable_increment_switch: SWITCH_ENABLE_INCREMENT,
        }
    }
}

impl CounterConfig {
    /// Create a configuration with custom threshold bounds and scale
    pub fn new(default_threshold: u32, max_threshold: u32, scale: u32) -> Result<Self, ConfigError> {
        let config = Self {
            default_threshold,
            max_threshold,
            scale,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        if self.max_threshold < self.default_threshold {
            return Err(ConfigError::ThresholdRange);
        }
        // A tick group must span two ticks so a debounce can observe elapsed time
        if self.scale < 2 {
            return Err(ConfigError::ScaleTooSmall);
        }
        if self.max_threshold.checked_mul(self.scale).is_none() {
            return Err(ConfigError::TickOverflow);
        }
        if self.display_width_bits == 0 || self.display_width_bits > 32 {
            return Err(ConfigError::DisplayWidth);
        }
        if self.increment_button == 0 || self.reset_button == Some(self.increment_button) {
            return Err(ConfigError::ButtonEncoding);
        }
        if self.disable_buttons_switch == 0 || self.enable_increment_switch == 0 {
            return Err(ConfigError::SwitchMask);
        }
        if self.timer_load == 0 {
            return Err(ConfigError::TimerLoad);
        }
        Ok(())
    }

    /// Number of ticks between automatic display increments
    pub const fn ticks_per_increment(&self, threshold: u32) -> u32 {
        threshold.saturating_mul(self.scale)
    }

    /// Mask applied to the display count
    pub const fn display_mask(&self) -> u32 {
        if self.display_width_bits >= 32 {
            u32::MAX
        } else {
            (1u32 << self.display_width_bits) - 1
        }
    }

    /// Decode a raw button value that bypasses debouncing
    pub fn button_action(&self, raw: u32) -> ButtonAction {
        match self.reset_button {
            Some(reset) if raw == reset => ButtonAction::Reset,
            _ => ButtonAction::Add(raw),
        }
    }

    /// Real-time period between timer expirations for a count-up timer at `clock_hz`
    pub fn tick_period(&self, clock_hz: u32) -> Result<Duration, ConfigError> {
        if clock_hz == 0 || self.timer_load == 0 {
            return Err(ConfigError::TimerLoad);
        }
        // The counter runs from the load value up to overflow
        let cycles = (1u64 << 32) - self.timer_load as u64;
        Ok(Duration::from_micros(cycles * 1_000_000 / clock_hz as u64))
    }
}

/// Feature flags written by the mode poller and read by both handlers
///
/// Each flag is a single atomic word, so handlers read them without masking.
pub struct FeatureFlags {
    buttons_enabled: AtomicBool,
    increment_enabled: AtomicBool,
}

impl FeatureFlags {
    /// Buttons enabled, increment button disabled
    pub const fn new() -> Self {
        Self {
            buttons_enabled: AtomicBool::new(true),
            increment_enabled: AtomicBool::new(false),
        }
    }

    pub fn buttons_enabled(&self) -> bool {
        self.buttons_enabled.load(Ordering::Acquire)
    }

    pub fn increment_enabled(&self) -> bool {
        self.increment_enabled.load(Ordering::Acquire)
    }

    pub fn set_buttons_enabled(&self, enabled: bool) {
        self.buttons_enabled.store(enabled, Ordering::Release);
    }

    pub fn set_increment_enabled(&self, enabled: bool) {
        self.increment_enabled.store(enabled, Ordering::Release);
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self::new()
    }
}
