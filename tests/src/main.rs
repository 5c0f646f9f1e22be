// Host simulation of the counter controller on a mock board

use counter_core::test_utils::{Bench, Stimulus};
use counter_core::*;
use heapless::Vec;

/// Scripted session: count, reset, raise the threshold, then lock the buttons
const SCRIPT: &[(&str, Stimulus)] = &[
    ("free-run one period", Stimulus::Ticks(24)),
    ("press button 3", Stimulus::Press(0b0100)),
    ("release", Stimulus::Release),
    ("press reset", Stimulus::Press(RESET_BUTTON)),
    ("release", Stimulus::Release),
    ("enable increment", Stimulus::Switches(SWITCH_ENABLE_INCREMENT)),
    ("press increment", Stimulus::Press(INCREMENT_BUTTON)),
    ("hold two ticks", Stimulus::Ticks(2)),
    ("release", Stimulus::Release),
    ("free-run", Stimulus::Ticks(64)),
    ("disable buttons", Stimulus::Switches(SWITCH_DISABLE_BUTTONS)),
    ("press while locked", Stimulus::Press(0b1000)),
    ("enable buttons", Stimulus::Switches(0)),
];

fn main() {
    println!("🔢 Counter controller simulation v{}", VERSION);

    let config = default_config();
    let mut bench = Bench::new(config);
    println!(
        "⚙️ threshold {} of {}, {} ticks per threshold unit",
        config.default_threshold, config.max_threshold, config.scale
    );
    if let Ok(period) = config.tick_period(100_000_000) {
        println!("⏱️ tick period {} us at 100 MHz", period.as_micros());
    }

    let mut trace: Vec<(u32, u32), 32> = Vec::new();
    for (label, stimulus) in SCRIPT {
        bench.run(core::slice::from_ref(stimulus));
        let state = bench.state();
        println!(
            "  {:<20} display={:2} ticks={:2} threshold={} debouncing={} armed={}",
            label,
            state.display_count(),
            state.tick_count(),
            state.threshold(),
            state.debounce().is_debouncing(),
            bench.buttons_armed()
        );
        if trace.push((state.display_count(), state.threshold())).is_err() {
            break;
        }
    }

    println!();
    println!(
        "📟 {} display writes, {} edges masked",
        bench.peripherals.display.writes().len(),
        bench.masked_edges()
    );
    println!("✅ Simulation finished after {} steps", trace.len());
}
