//! Xilinx AXI timer driver, timer 0 in generate mode counting up

use counter_core::hal::{HalError, TickTimer};

/// Register offsets
const TCSR0: usize = 0x00; // Control/status
const TLR0: usize = 0x04; // Load

/// TCSR0 bits
const ARHT0: u32 = 1 << 4; // Auto reload
const LOAD0: u32 = 1 << 5; // Load counter from TLR0
const ENIT0: u32 = 1 << 6; // Interrupt enable
const ENT0: u32 = 1 << 7; // Counter enable
const T0INT: u32 = 1 << 8; // Expired, write 1 to clear

pub struct AxiTimer {
    base: usize,
    configured: bool,
}

impl AxiTimer {
    /// # Safety
    /// `base` must be the address of an AXI timer block, and only one handle may
    /// exist per block.
    pub const unsafe fn new(base: usize) -> Self {
        Self {
            base,
            configured: false,
        }
    }

    fn read_csr(&self) -> u32 {
        unsafe { core::ptr::read_volatile((self.base + TCSR0) as *const u32) }
    }

    fn write_reg(&mut self, offset: usize, value: u32) {
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }
}

impl TickTimer for AxiTimer {
    fn configure(&mut self, load: u32) -> Result<(), HalError> {
        self.write_reg(TCSR0, 0);
        self.write_reg(TLR0, load);
        // Clear a stale expiration, then select interrupt + auto-reload mode
        self.write_reg(TCSR0, T0INT);
        self.write_reg(TCSR0, ARHT0 | ENIT0);
        self.configured = true;
        Ok(())
    }

    fn start(&mut self) -> Result<(), HalError> {
        if !self.configured {
            return Err(HalError::NotInitialized);
        }
        let csr = self.read_csr() & !(LOAD0 | T0INT);
        self.write_reg(TCSR0, csr | ENT0);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), HalError> {
        let csr = self.read_csr() & !(ENT0 | T0INT);
        self.write_reg(TCSR0, csr);
        Ok(())
    }

    fn reset(&mut self) -> Result<(), HalError> {
        let csr = self.read_csr() & !T0INT;
        self.write_reg(TCSR0, csr | LOAD0 | T0INT);
        self.write_reg(TCSR0, csr & !LOAD0);
        Ok(())
    }

    fn is_expired(&mut self) -> Result<bool, HalError> {
        Ok(self.read_csr() & T0INT != 0)
    }
}
