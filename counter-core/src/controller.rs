//! Shared state and the two interrupt handlers
//!
//! Both handlers take `&mut self`: whoever calls them must hold exclusive access to
//! the controller for the duration of the call. On the target that is guaranteed by
//! each handler masking its own source and by the two sources sharing one priority.

use crate::debounce::{DebounceState, DebounceVerdict};
use crate::hal::{ButtonPort, DisplayPort, HalError, Peripherals, SwitchPort, TickTimer};
use crate::mode::ModeUpdate;
use crate::types::{ButtonAction, CounterConfig, FeatureFlags};

/// Mutable state shared by the handlers and the mode poller
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SharedState {
    display_count: u32,
    tick_count: u32,
    threshold: u32,
    debounce: DebounceState,
    last_input: u32,
}

impl SharedState {
    pub const fn new(threshold: u32) -> Self {
        Self {
            display_count: 0,
            tick_count: 0,
            threshold,
            debounce: DebounceState::Idle,
            last_input: 0,
        }
    }

    pub const fn display_count(&self) -> u32 {
        self.display_count
    }

    pub const fn tick_count(&self) -> u32 {
        self.tick_count
    }

    pub const fn threshold(&self) -> u32 {
        self.threshold
    }

    pub const fn debounce(&self) -> DebounceState {
        self.debounce
    }

    /// Last raw button value observed by either handler
    pub const fn last_input(&self) -> u32 {
        self.last_input
    }
}

/// Result of servicing a timer interrupt
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Timer had not expired; nothing was touched
    Spurious,
    /// Tick serviced
    Serviced {
        debounce: DebounceVerdict,
        rolled_over: bool,
    },
}

/// Result of servicing a button interrupt
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeOutcome {
    /// Status did not belong to the button bus; source left masked
    Spurious,
    /// Increment press deferred to the timer; source left masked
    Debouncing,
    /// Display updated and source re-armed
    Applied { display: u32 },
}

/// Counter controller: configuration plus shared state
#[derive(Clone, Debug)]
pub struct CounterController {
    config: CounterConfig,
    state: SharedState,
}

impl CounterController {
    /// Create a controller at the configured default threshold
    pub fn new(config: CounterConfig) -> Self {
        Self {
            state: SharedState::new(config.default_threshold),
            config,
        }
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Ticks between automatic increments at the current threshold
    pub fn ticks_per_increment(&self) -> u32 {
        self.config.ticks_per_increment(self.state.threshold)
    }

    /// Timer interrupt handler
    ///
    /// Returns without side effects when the timer has not expired. Otherwise the
    /// timer is stopped, the debounce machine and tick counter advance, and the
    /// timer is reset and restarted even if servicing failed.
    pub fn on_timer_tick<B, D, S, T>(
        &mut self,
        flags: &FeatureFlags,
        peripherals: &mut Peripherals<B, D, S, T>,
    ) -> Result<TickOutcome, HalError>
    where
        B: ButtonPort,
        D: DisplayPort,
        S: SwitchPort,
        T: TickTimer,
    {
        if !peripherals.timer.is_expired()? {
            return Ok(TickOutcome::Spurious);
        }
        peripherals.timer.stop()?;

        let serviced = self.service_tick(flags, &mut peripherals.buttons, &mut peripherals.display);

        peripherals.timer.reset()?;
        peripherals.timer.start()?;
        serviced
    }

    fn service_tick<B, D>(
        &mut self,
        flags: &FeatureFlags,
        buttons: &mut B,
        display: &mut D,
    ) -> Result<TickOutcome, HalError>
    where
        B: ButtonPort,
        D: DisplayPort,
    {
        // The tick is counted even when sampling the buttons fails
        let debounce = self.evaluate_debounce(flags, buttons);
        let rolled_over = self.advance_tick(display)?;
        Ok(TickOutcome::Serviced {
            debounce: debounce?,
            rolled_over,
        })
    }

    fn evaluate_debounce<B: ButtonPort>(
        &mut self,
        flags: &FeatureFlags,
        buttons: &mut B,
    ) -> Result<DebounceVerdict, HalError> {
        if !self.state.debounce.is_debouncing() {
            return Ok(DebounceVerdict::Idle);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("debouncing . . .");

        // Edge interrupt is masked while debouncing; sample the bus directly
        self.state.last_input = buttons.read()?;
        let held = self.state.last_input == self.config.increment_button;
        let verdict = self.state.debounce.evaluate(
            self.state.tick_count,
            held,
            flags.increment_enabled(),
            self.config.release_policy,
        );

        match verdict {
            DebounceVerdict::Confirmed => {
                self.state.threshold = (self.state.threshold + 1).min(self.config.max_threshold);
                #[cfg(feature = "defmt")]
                defmt::info!("# expirations: {=u32}", self.state.threshold);
                self.rearm_buttons(flags, buttons)?;
            }
            DebounceVerdict::Cancelled => {
                #[cfg(feature = "defmt")]
                defmt::debug!("debounce cancelled, input {=u32:#x}", self.state.last_input);
                self.rearm_buttons(flags, buttons)?;
            }
            DebounceVerdict::Idle | DebounceVerdict::Pending => {}
        }
        Ok(verdict)
    }

    fn advance_tick<D: DisplayPort>(&mut self, display: &mut D) -> Result<bool, HalError> {
        // `>=` keeps the counter bounded when a reset lowers the threshold mid-cycle
        if self.state.tick_count + 1 >= self.ticks_per_increment() {
            self.state.tick_count = 0;
            self.state.display_count = self.wrap_display(self.state.display_count.wrapping_add(1));
            #[cfg(feature = "defmt")]
            defmt::trace!("display rollover -> {=u32}", self.state.display_count);
            display.write(self.state.display_count)?;
            Ok(true)
        } else {
            self.state.tick_count += 1;
            Ok(false)
        }
    }

    /// Button interrupt handler
    ///
    /// Masks the button source on entry. Spurious and debouncing paths leave it
    /// masked; every other path re-arms it, including when servicing failed.
    pub fn on_button_edge<B, D, S, T>(
        &mut self,
        flags: &FeatureFlags,
        peripherals: &mut Peripherals<B, D, S, T>,
    ) -> Result<EdgeOutcome, HalError>
    where
        B: ButtonPort,
        D: DisplayPort,
        S: SwitchPort,
        T: TickTimer,
    {
        peripherals.buttons.disable_interrupt()?;

        let outcome = self.service_edge(flags, &mut peripherals.buttons, &mut peripherals.display);
        if matches!(outcome, Ok(EdgeOutcome::Spurious | EdgeOutcome::Debouncing)) {
            return outcome;
        }

        let rearmed = self.rearm_buttons(flags, &mut peripherals.buttons);
        let outcome = outcome?;
        rearmed?;
        Ok(outcome)
    }

    fn service_edge<B, D>(
        &mut self,
        flags: &FeatureFlags,
        buttons: &mut B,
        display: &mut D,
    ) -> Result<EdgeOutcome, HalError>
    where
        B: ButtonPort,
        D: DisplayPort,
    {
        if !buttons.interrupt_pending()? {
            #[cfg(feature = "defmt")]
            defmt::debug!("spurious button interrupt ignored");
            return Ok(EdgeOutcome::Spurious);
        }

        let value = buttons.read()?;
        self.state.last_input = value;
        #[cfg(feature = "defmt")]
        defmt::info!(
            "button pressed: {=u32:#x}  # expirations: {=u32}  inc enabled: {=bool}",
            value,
            self.state.threshold,
            flags.increment_enabled()
        );

        if flags.increment_enabled()
            && value == self.config.increment_button
            && self.state.threshold < self.config.max_threshold
        {
            self.state.debounce.begin(self.state.tick_count);
            return Ok(EdgeOutcome::Debouncing);
        }

        self.state.display_count = match self.config.button_action(value) {
            ButtonAction::Reset => 0,
            ButtonAction::Add(amount) => self.wrap_display(self.state.display_count.wrapping_add(amount)),
        };
        #[cfg(feature = "defmt")]
        defmt::info!("LED count: {=u32:#x}", self.state.display_count);

        display.write(self.state.display_count)?;
        Ok(EdgeOutcome::Applied {
            display: self.state.display_count,
        })
    }

    /// Apply one mode-poll result
    ///
    /// Mutates threshold, display count and debounce state together; callers on
    /// the target run this with interrupts disabled.
    pub fn apply_mode<B, D, S, T>(
        &mut self,
        update: &ModeUpdate,
        flags: &FeatureFlags,
        peripherals: &mut Peripherals<B, D, S, T>,
    ) -> Result<(), HalError>
    where
        B: ButtonPort,
        D: DisplayPort,
        S: SwitchPort,
        T: TickTimer,
    {
        if update.enable_buttons {
            self.enable_buttons(flags, &mut peripherals.buttons)?;
        }
        if update.disable_and_reset {
            self.disable_and_reset(flags, &mut peripherals.buttons, &mut peripherals.display)?;
        }
        if let Some(enabled) = update.increment {
            flags.set_increment_enabled(enabled);
        }
        Ok(())
    }

    /// Re-enable the button interrupt after the disable switch turns off
    pub fn enable_buttons<B: ButtonPort>(&mut self, flags: &FeatureFlags, buttons: &mut B) -> Result<(), HalError> {
        flags.set_buttons_enabled(true);
        buttons.enable_interrupt()
    }

    /// Mask the buttons and reset threshold, display count and debounce state
    ///
    /// Idempotent; the display is only rewritten when the count changes.
    pub fn disable_and_reset<B, D>(
        &mut self,
        flags: &FeatureFlags,
        buttons: &mut B,
        display: &mut D,
    ) -> Result<(), HalError>
    where
        B: ButtonPort,
        D: DisplayPort,
    {
        flags.set_buttons_enabled(false);
        buttons.disable_interrupt()?;
        self.state.threshold = self.config.default_threshold;
        self.state.debounce.cancel();
        if self.state.display_count != 0 {
            self.state.display_count = 0;
            display.write(0)?;
        }
        Ok(())
    }

    fn rearm_buttons<B: ButtonPort>(&self, flags: &FeatureFlags, buttons: &mut B) -> Result<(), HalError> {
        buttons.clear_interrupt()?;
        if flags.buttons_enabled() {
            buttons.enable_interrupt()?;
        }
        Ok(())
    }

    fn wrap_display(&self, value: u32) -> u32 {
        value & self.config.display_mask()
    }
}
