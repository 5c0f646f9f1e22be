//! Test utilities: a simulated board driving the controller through mock peripherals

use crate::controller::{CounterController, EdgeOutcome, SharedState, TickOutcome};
use crate::hal::mock::{mock_peripherals, MockInterruptController, MockPeripherals};
use crate::hal::SwitchPort;
use crate::mode::{ModePoller, ModeUpdate};
use crate::startup::bring_up;
use crate::types::{CounterConfig, FeatureFlags};

/// Scripted stimulus for [`Bench::run`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stimulus {
    /// Drive the button bus to a raw value
    Press(u32),
    /// Drive the button bus to zero
    Release,
    /// Expire the timer `n` times
    Ticks(u32),
    /// Set the mode-select bus and poll it once
    Switches(u32),
    /// Poll the mode-select bus without changing it
    Poll,
}

/// Simulated board
///
/// Edges are delivered to the button handler only while the button interrupt is
/// unmasked, which is how the interrupt line behaves on hardware.
pub struct Bench {
    pub controller: CounterController,
    pub flags: FeatureFlags,
    pub peripherals: MockPeripherals,
    pub intc: MockInterruptController,
    poller: ModePoller,
    masked_edges: u32,
}

impl Bench {
    /// Bring up a board with `config`, switches all off
    pub fn new(config: CounterConfig) -> Self {
        let mut peripherals = mock_peripherals();
        let mut intc = MockInterruptController::new();
        bring_up(&config, &mut peripherals, &mut intc).expect("mock bring-up cannot fail");
        let initial = peripherals.switches.read().expect("mock switches cannot fail");

        Self {
            controller: CounterController::new(config),
            flags: FeatureFlags::new(),
            peripherals,
            intc,
            poller: ModePoller::new(&config, initial),
            masked_edges: 0,
        }
    }

    /// Board with the default configuration and the increment button enabled
    pub fn with_increment_enabled() -> Self {
        let mut bench = Self::new(CounterConfig::default());
        bench.set_switches(bench.controller.config().enable_increment_switch);
        bench
    }

    pub fn state(&self) -> &SharedState {
        self.controller.state()
    }

    /// Value currently shown on the display bus
    pub fn shown(&self) -> Option<u32> {
        self.peripherals.display.shown()
    }

    /// True when the button interrupt is unmasked
    pub fn buttons_armed(&self) -> bool {
        self.peripherals.buttons.is_enabled()
    }

    /// Edges that arrived while the button interrupt was masked
    pub fn masked_edges(&self) -> u32 {
        self.masked_edges
    }

    /// Drive the button bus to `value`, servicing the edge if the line fires
    pub fn press(&mut self, value: u32) -> Option<EdgeOutcome> {
        let before = self.peripherals.buttons.value();
        self.peripherals.buttons.set_value(value);
        if self.peripherals.buttons.should_fire() {
            Some(
                self.controller
                    .on_button_edge(&self.flags, &mut self.peripherals)
                    .expect("mock buttons cannot fail"),
            )
        } else {
            if before != value {
                self.masked_edges += 1;
            }
            None
        }
    }

    pub fn release(&mut self) -> Option<EdgeOutcome> {
        self.press(0)
    }

    /// Invoke the button handler with a status that belongs to another source
    pub fn spurious_edge(&mut self) -> EdgeOutcome {
        self.peripherals.buttons.latch_foreign();
        self.controller
            .on_button_edge(&self.flags, &mut self.peripherals)
            .expect("mock buttons cannot fail")
    }

    /// One timer expiration
    pub fn tick(&mut self) -> TickOutcome {
        self.peripherals.timer.expire();
        self.controller
            .on_timer_tick(&self.flags, &mut self.peripherals)
            .expect("mock timer cannot fail")
    }

    /// `n` timer expirations; returns how many rolled the display over
    pub fn ticks(&mut self, n: u32) -> u32 {
        let mut rollovers = 0;
        for _ in 0..n {
            if let TickOutcome::Serviced { rolled_over: true, .. } = self.tick() {
                rollovers += 1;
            }
        }
        rollovers
    }

    /// Tick until the display rolls over; `None` if it does not within the
    /// longest possible period
    pub fn ticks_until_rollover(&mut self) -> Option<u32> {
        let config = self.controller.config();
        let longest = config.ticks_per_increment(config.max_threshold);
        (1..=longest).find(|_| matches!(self.tick(), TickOutcome::Serviced { rolled_over: true, .. }))
    }

    /// Set the mode-select bus and run one poll cycle
    pub fn set_switches(&mut self, value: u32) -> ModeUpdate {
        self.peripherals.switches.set(value);
        self.poll_mode()
    }

    /// One poll cycle of the mode-select loop
    pub fn poll_mode(&mut self) -> ModeUpdate {
        let switches = self.peripherals.switches.read().expect("mock switches cannot fail");
        let update = self.poller.poll(switches);
        if update.needs_apply() {
            self.controller
                .apply_mode(&update, &self.flags, &mut self.peripherals)
                .expect("mock peripherals cannot fail");
        }
        update
    }

    /// Play a script of stimuli in order
    pub fn run(&mut self, script: &[Stimulus]) {
        for stimulus in script {
            match *stimulus {
                Stimulus::Press(value) => {
                    self.press(value);
                }
                Stimulus::Release => {
                    self.release();
                }
                Stimulus::Ticks(n) => {
                    self.ticks(n);
                }
                Stimulus::Switches(value) => {
                    self.set_switches(value);
                }
                Stimulus::Poll => {
                    self.poll_mode();
                }
            }
        }
    }
}
