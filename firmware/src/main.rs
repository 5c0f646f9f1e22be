#![no_std]
#![no_main]

#[cfg(feature = "defmt")]
use defmt_rtt as _;

#[cfg(feature = "panic-probe")]
use panic_probe as _;
#[cfg(not(feature = "panic-probe"))]
use panic_halt as _;

use counter_firmware::app;

/// Firmware entry point
#[riscv_rt::entry]
fn main() -> ! {
    #[cfg(feature = "defmt")]
    defmt::info!("counter firmware {=str} starting", counter_firmware::counter_core::VERSION);

    match app::start(counter_firmware::counter_core::default_config()) {
        Ok(poller) => app::run(poller),
        Err(_error) => {
            #[cfg(feature = "defmt")]
            defmt::error!("bring-up failed: {}", _error);
            loop {
                unsafe { riscv::asm::wfi() };
            }
        }
    }
}

/// Machine external interrupt vector
#[export_name = "MachineExternal"]
extern "C" fn machine_external() {
    app::dispatch_external();
}
