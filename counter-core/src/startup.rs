//! One-shot bring-up of timer, button interrupt and interrupt controller

use crate::hal::{
    ButtonPort, DisplayPort, HalError, InterruptController, IrqSource, Peripherals, SwitchPort, TickTimer,
};
use crate::types::CounterConfig;

/// Bring the peripherals into the running state
///
/// Any failure is fatal: the caller must not enter the poll loop.
pub fn bring_up<B, D, S, T, I>(
    config: &CounterConfig,
    peripherals: &mut Peripherals<B, D, S, T>,
    intc: &mut I,
) -> Result<(), HalError>
where
    B: ButtonPort,
    D: DisplayPort,
    S: SwitchPort,
    T: TickTimer,
    I: InterruptController,
{
    config.validate().map_err(|_| HalError::InvalidConfig)?;

    peripherals.timer.configure(config.timer_load)?;
    peripherals.display.write(0)?;

    peripherals.buttons.clear_interrupt()?;
    peripherals.buttons.enable_interrupt()?;

    intc.enable_source(IrqSource::Buttons)?;
    intc.enable_source(IrqSource::Timer)?;
    intc.global_enable()?;

    peripherals.timer.start()?;

    #[cfg(feature = "defmt")]
    defmt::info!("timer load {=u32:#x}, polling . . .", config.timer_load);
    Ok(())
}
