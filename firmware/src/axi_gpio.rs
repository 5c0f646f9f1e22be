//! Xilinx AXI GPIO driver (channel 1 only)

use counter_core::hal::{ButtonPort, DisplayPort, HalError, SwitchPort};

/// Register offsets
const GPIO_DATA: usize = 0x000; // Channel 1 data
const GPIO_TRI: usize = 0x004; // Channel 1 direction, 1 = input
const GIER: usize = 0x11C; // Global interrupt enable
const IP_ISR: usize = 0x120; // Interrupt status, toggle-on-write
const IP_IER: usize = 0x128; // Interrupt enable

const GIER_ENABLE: u32 = 1 << 31;
const CHANNEL_1: u32 = 0x1;

/// One AXI GPIO instance
pub struct AxiGpio {
    base: usize,
    mask: u32,
}

impl AxiGpio {
    /// # Safety
    /// `base` must be the address of an AXI GPIO block, and only one handle may
    /// exist per block.
    pub const unsafe fn new(base: usize, width: u8) -> Self {
        Self {
            base,
            mask: if width >= 32 { u32::MAX } else { (1 << width) - 1 },
        }
    }

    fn read_reg(&self, offset: usize) -> u32 {
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u32) }
    }

    fn write_reg(&mut self, offset: usize, value: u32) {
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }

    /// Configure every line as input
    pub fn into_inputs(mut self) -> Self {
        self.write_reg(GPIO_TRI, self.mask);
        self
    }

    /// Configure every line as output
    pub fn into_outputs(mut self) -> Self {
        self.write_reg(GPIO_TRI, 0);
        self
    }

    fn read_data(&self) -> u32 {
        self.read_reg(GPIO_DATA) & self.mask
    }
}

impl ButtonPort for AxiGpio {
    fn read(&mut self) -> Result<u32, HalError> {
        Ok(self.read_data())
    }

    fn enable_interrupt(&mut self) -> Result<(), HalError> {
        let ier = self.read_reg(IP_IER);
        self.write_reg(IP_IER, ier | CHANNEL_1);
        self.write_reg(GIER, GIER_ENABLE);
        Ok(())
    }

    fn disable_interrupt(&mut self) -> Result<(), HalError> {
        let ier = self.read_reg(IP_IER);
        self.write_reg(IP_IER, ier & !CHANNEL_1);
        Ok(())
    }

    fn clear_interrupt(&mut self) -> Result<(), HalError> {
        // Writing a set bit toggles it back to zero
        let isr = self.read_reg(IP_ISR);
        self.write_reg(IP_ISR, isr & CHANNEL_1);
        Ok(())
    }

    fn interrupt_pending(&mut self) -> Result<bool, HalError> {
        Ok(self.read_reg(IP_ISR) & CHANNEL_1 == CHANNEL_1)
    }
}

impl DisplayPort for AxiGpio {
    fn write(&mut self, value: u32) -> Result<(), HalError> {
        let masked = value & self.mask;
        self.write_reg(GPIO_DATA, masked);
        Ok(())
    }
}

impl SwitchPort for AxiGpio {
    fn read(&mut self) -> Result<u32, HalError> {
        Ok(self.read_data())
    }
}
