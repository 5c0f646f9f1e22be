//! Application wiring: shared controller, interrupt entry points, mode-poll loop

use core::cell::RefCell;

use counter_core::hal::{HalError, Peripherals, SwitchPort};
use counter_core::{bring_up, CounterConfig, CounterController, FeatureFlags, ModePoller};
use critical_section::Mutex;

use crate::axi_gpio::AxiGpio;
use crate::axi_timer::AxiTimer;
use crate::board;
use crate::plic::Plic;

type BoardPeripherals = Peripherals<AxiGpio, AxiGpio, AxiGpio, AxiTimer>;

/// Controller and the devices it drives
pub struct App {
    controller: CounterController,
    peripherals: BoardPeripherals,
}

/// Installed once by `start`, then touched only by the handlers and the poll loop
static APP: Mutex<RefCell<Option<App>>> = Mutex::new(RefCell::new(None));

/// Feature flags are single atomic words, read by handlers without locking
static FLAGS: FeatureFlags = FeatureFlags::new();

fn board_peripherals() -> BoardPeripherals {
    // Single call site at startup; each block gets exactly one handle
    unsafe {
        Peripherals::new(
            AxiGpio::new(board::BUTTONS_BASE, board::BUS_WIDTH).into_inputs(),
            AxiGpio::new(board::LEDS_BASE, board::BUS_WIDTH).into_outputs(),
            AxiGpio::new(board::SWITCHES_BASE, board::BUS_WIDTH).into_inputs(),
            AxiTimer::new(board::TIMER_BASE),
        )
    }
}

/// Bring up the hardware and install the controller
///
/// Hart interrupts stay disabled until the controller is installed, so neither
/// handler can observe a half-initialised system.
pub fn start(config: CounterConfig) -> Result<ModePoller, HalError> {
    let mut peripherals = board_peripherals();
    let mut plic = unsafe { Plic::new(board::PLIC_BASE) };

    bring_up(&config, &mut peripherals, &mut plic)?;
    let initial = SwitchPort::read(&mut peripherals.switches)?;

    #[cfg(feature = "defmt")]
    if let Ok(period) = config.tick_period(board::TIMER_CLOCK_HZ) {
        info!("tick period {=u64} us", period.as_micros());
    }

    critical_section::with(|cs| {
        APP.borrow(cs).replace(Some(App {
            controller: CounterController::new(config),
            peripherals,
        }));
    });

    unsafe { riscv::interrupt::enable() };
    info!("controller installed, polling . . .");
    Ok(ModePoller::new(&config, initial))
}

/// Machine external interrupt: drain the PLIC and dispatch by source
pub fn dispatch_external() {
    let mut plic = unsafe { Plic::new(board::PLIC_BASE) };
    while let Some(id) = plic.claim() {
        match id {
            board::BUTTONS_IRQ => button_interrupt(),
            board::TIMER_IRQ => timer_interrupt(),
            _ => debug!("unexpected PLIC source {=u32}", id),
        }
        plic.complete(id);
    }
}

fn button_interrupt() {
    critical_section::with(|cs| {
        if let Some(app) = APP.borrow_ref_mut(cs).as_mut() {
            if let Err(_error) = app.controller.on_button_edge(&FLAGS, &mut app.peripherals) {
                warn!("button handler failed: {}", _error);
            }
        }
    });
}

fn timer_interrupt() {
    critical_section::with(|cs| {
        if let Some(app) = APP.borrow_ref_mut(cs).as_mut() {
            if let Err(_error) = app.controller.on_timer_tick(&FLAGS, &mut app.peripherals) {
                warn!("timer handler failed: {}", _error);
            }
        }
    });
}

/// One mode-poll cycle
///
/// Interrupts are masked only for the bus read and, when the sample calls for
/// it, for `apply_mode`, so the three-field reset is atomic to both handlers.
fn poll_once(poller: &mut ModePoller) -> Result<(), HalError> {
    let sample = critical_section::with(|cs| {
        APP.borrow_ref_mut(cs)
            .as_mut()
            .map(|app| SwitchPort::read(&mut app.peripherals.switches))
    });
    let Some(switches) = sample.transpose()? else {
        return Ok(());
    };

    let update = poller.poll(switches);
    if !update.needs_apply() {
        return Ok(());
    }

    critical_section::with(|cs| match APP.borrow_ref_mut(cs).as_mut() {
        Some(app) => app.controller.apply_mode(&update, &FLAGS, &mut app.peripherals),
        None => Ok(()),
    })
}

/// Cooperative mode-select loop, preempted by both handlers
pub fn run(mut poller: ModePoller) -> ! {
    loop {
        if let Err(_error) = poll_once(&mut poller) {
            warn!("mode poll failed: {}", _error);
        }
    }
}
