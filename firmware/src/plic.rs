//! Platform-level interrupt controller, hart 0 machine context

use counter_core::hal::{HalError, InterruptController, IrqSource};

use crate::board::{BUTTONS_IRQ, TIMER_IRQ};

const PRIORITY: usize = 0x0000_0000; // 4 bytes per source
const ENABLE: usize = 0x0000_2000; // Context 0 enable bits
const THRESHOLD: usize = 0x0020_0000; // Context 0 priority threshold
const CLAIM: usize = 0x0020_0004; // Context 0 claim/complete

/// Both sources share one priority so neither handler preempts the other
const SOURCE_PRIORITY: u32 = 1;

pub struct Plic {
    base: usize,
}

impl Plic {
    /// # Safety
    /// `base` must be the address of the PLIC.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    fn read_reg(&self, offset: usize) -> u32 {
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u32) }
    }

    fn write_reg(&mut self, offset: usize, value: u32) {
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }

    /// Claim the highest-priority pending source
    pub fn claim(&mut self) -> Option<u32> {
        match self.read_reg(CLAIM) {
            0 => None,
            id => Some(id),
        }
    }

    /// Signal completion of a claimed source
    pub fn complete(&mut self, id: u32) {
        self.write_reg(CLAIM, id);
    }

    const fn source_id(source: IrqSource) -> u32 {
        match source {
            IrqSource::Buttons => BUTTONS_IRQ,
            IrqSource::Timer => TIMER_IRQ,
        }
    }
}

impl InterruptController for Plic {
    fn enable_source(&mut self, source: IrqSource) -> Result<(), HalError> {
        let id = Self::source_id(source);
        if id >= 32 {
            return Err(HalError::InterruptError);
        }
        self.write_reg(PRIORITY + 4 * id as usize, SOURCE_PRIORITY);
        let enabled = self.read_reg(ENABLE);
        self.write_reg(ENABLE, enabled | (1 << id));
        Ok(())
    }

    fn disable_source(&mut self, source: IrqSource) -> Result<(), HalError> {
        let id = Self::source_id(source);
        let enabled = self.read_reg(ENABLE);
        self.write_reg(ENABLE, enabled & !(1 << id));
        Ok(())
    }

    /// Route external interrupts to the hart
    ///
    /// Leaves `mstatus.MIE` alone; the hart-level enable is the critical-section
    /// switch and is turned on by the application once its state is installed.
    fn global_enable(&mut self) -> Result<(), HalError> {
        self.write_reg(THRESHOLD, 0);
        unsafe { riscv::register::mie::set_mext() };
        Ok(())
    }
}
