//! Mode-select polling

use crate::types::CounterConfig;

/// Actions derived from one mode-select sample
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeUpdate {
    /// Raw mode-select value
    pub switches: u32,
    /// Value differs from the previous poll
    pub changed: bool,
    /// Disable switch went on -> off; re-enable the button interrupt
    pub enable_buttons: bool,
    /// Disable switch is on; mask buttons and reset state
    pub disable_and_reset: bool,
    /// New increment-button flag, `None` leaves it unchanged
    pub increment: Option<bool>,
}

impl ModeUpdate {
    /// True when applying this update can change shared state
    ///
    /// The increment flag only moves when the bus value changes, and the reset
    /// must be reapplied on every poll while the disable switch is on.
    pub const fn needs_apply(&self) -> bool {
        self.changed || self.disable_and_reset
    }
}

/// Cooperative poller for the mode-select bus
#[derive(Clone, Debug)]
pub struct ModePoller {
    last: u32,
    disable_mask: u32,
    increment_mask: u32,
}

impl ModePoller {
    /// Create a poller seeded with the value read at startup
    pub fn new(config: &CounterConfig, initial: u32) -> Self {
        Self {
            last: initial,
            disable_mask: config.disable_buttons_switch,
            increment_mask: config.enable_increment_switch,
        }
    }

    /// Value seen by the most recent poll
    pub fn last(&self) -> u32 {
        self.last
    }

    /// Process one sample of the mode-select bus
    pub fn poll(&mut self, switches: u32) -> ModeUpdate {
        let previous = self.last;
        let changed = switches != previous;
        if changed {
            self.last = switches;
            #[cfg(feature = "defmt")]
            defmt::info!("new switch value: {=u32:#x}", switches);
        }

        ModeUpdate {
            switches,
            changed,
            enable_buttons: changed && self.disable_on(previous) && !self.disable_on(switches),
            disable_and_reset: self.disable_on(switches),
            increment: self.increment_setting(switches),
        }
    }

    fn disable_on(&self, switches: u32) -> bool {
        switches & self.disable_mask == self.disable_mask
    }

    fn increment_setting(&self, switches: u32) -> Option<bool> {
        match switches & self.increment_mask {
            bits if bits == self.increment_mask => Some(true),
            0 => Some(false),
            _ => None,
        }
    }
}
