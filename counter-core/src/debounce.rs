//! Tick-driven debounce state machine for the increment button

use crate::types::ReleasePolicy;

/// Debounce state
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DebounceState {
    /// No press under evaluation
    #[default]
    Idle,
    /// Press seen at `start_tick`, waiting for a later tick to confirm it
    Debouncing { start_tick: u32 },
}

/// Result of evaluating the machine on a timer tick
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DebounceVerdict {
    /// Nothing to evaluate
    Idle,
    /// Still debouncing
    Pending,
    /// Press held across a tick boundary
    Confirmed,
    /// Debounce abandoned without confirming
    Cancelled,
}

impl DebounceVerdict {
    /// True when the machine left `Debouncing` on this tick
    pub const fn resolved(&self) -> bool {
        matches!(self, DebounceVerdict::Confirmed | DebounceVerdict::Cancelled)
    }
}

impl DebounceState {
    pub const fn is_debouncing(&self) -> bool {
        matches!(self, DebounceState::Debouncing { .. })
    }

    /// Tick at which the current debounce began
    pub const fn start_tick(&self) -> Option<u32> {
        match self {
            DebounceState::Debouncing { start_tick } => Some(*start_tick),
            DebounceState::Idle => None,
        }
    }

    /// Start debouncing a press observed at `tick`
    pub fn begin(&mut self, tick: u32) {
        *self = DebounceState::Debouncing { start_tick: tick };
    }

    /// Force the machine back to `Idle`
    pub fn cancel(&mut self) {
        *self = DebounceState::Idle;
    }

    /// Advance the machine on a timer tick
    ///
    /// `held` is whether the latest button sample still equals the increment value.
    pub fn evaluate(
        &mut self,
        current_tick: u32,
        held: bool,
        increment_enabled: bool,
        policy: ReleasePolicy,
    ) -> DebounceVerdict {
        let DebounceState::Debouncing { start_tick } = *self else {
            return DebounceVerdict::Idle;
        };

        if !increment_enabled {
            *self = DebounceState::Idle;
            return DebounceVerdict::Cancelled;
        }

        if current_tick == start_tick {
            return DebounceVerdict::Pending;
        }

        if held {
            *self = DebounceState::Idle;
            return DebounceVerdict::Confirmed;
        }

        match policy {
            ReleasePolicy::Cancel => {
                *self = DebounceState::Idle;
                DebounceVerdict::Cancelled
            }
            ReleasePolicy::Retain => DebounceVerdict::Pending,
        }
    }
}
