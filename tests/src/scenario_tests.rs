//! End-to-end scenarios on the simulated board

#[cfg(test)]
mod tests {
    use counter_core::test_utils::{Bench, Stimulus};
    use counter_core::*;
    use rstest::rstest;

    fn serviced(debounce: DebounceVerdict) -> TickOutcome {
        TickOutcome::Serviced {
            debounce,
            rolled_over: false,
        }
    }

    #[test]
    fn bring_up_leaves_board_live() {
        let bench = Bench::new(CounterConfig::default());

        assert_eq!(bench.shown(), Some(0));
        assert!(bench.buttons_armed());
        assert!(bench.peripherals.timer.is_running());
        assert_eq!(bench.peripherals.timer.load(), Some(DEFAULT_TIMER_LOAD));
        assert!(bench.intc.is_source_enabled(IrqSource::Buttons));
        assert!(bench.intc.is_source_enabled(IrqSource::Timer));
        assert!(bench.intc.is_global_enabled());
        assert_eq!(bench.state().threshold(), DEFAULT_THRESHOLD);
    }

    #[test]
    fn tick_period_is_an_embassy_duration() {
        let period: embassy_time::Duration = CounterConfig::default().tick_period(100_000_000).unwrap();

        assert_eq!(period, embassy_time::Duration::from_micros(191_739));
        assert_eq!((period * 24).as_millis(), 4_601);
    }

    #[test]
    fn twenty_four_ticks_advance_display_once() {
        let mut bench = Bench::new(CounterConfig::default());

        assert_eq!(bench.ticks(23), 0);
        assert_eq!(bench.shown(), Some(0));
        assert_eq!(bench.ticks(1), 1);
        assert_eq!(bench.state().display_count(), 1);
        assert_eq!(bench.state().tick_count(), 0);
        assert_eq!(bench.shown(), Some(1));
    }

    #[rstest]
    #[case(1, 8)]
    #[case(3, 24)]
    #[case(5, 40)]
    #[case(7, 56)]
    fn rollover_period_follows_threshold(#[case] threshold: u32, #[case] period: u32) {
        let config = CounterConfig::new(threshold, MAX_THRESHOLD, SCALE_FACTOR).unwrap();
        let mut bench = Bench::new(config);

        assert_eq!(bench.ticks(period - 1), 0);
        assert_eq!(bench.ticks(1), 1);
        assert_eq!(bench.ticks(period * 3), 3);
        assert_eq!(bench.state().display_count(), 4);
    }

    #[test]
    fn display_wraps_at_sixteen() {
        let mut bench = Bench::new(CounterConfig::default());
        bench.ticks(24 * 15);
        assert_eq!(bench.state().display_count(), 15);

        bench.ticks(24);
        assert_eq!(bench.state().display_count(), 0);
        assert_eq!(bench.shown(), Some(0));
    }

    #[rstest]
    #[case(0b0100, 4)]
    #[case(0b1000, 8)]
    #[case(0b1100, 12)]
    #[case(0b0110, 6)]
    fn plain_press_adds_raw_value(#[case] raw: u32, #[case] expected: u32) {
        let mut bench = Bench::new(CounterConfig::default());

        assert_eq!(bench.press(raw), Some(EdgeOutcome::Applied { display: expected }));
        assert_eq!(bench.shown(), Some(expected));
        assert!(bench.buttons_armed());
    }

    #[test]
    fn sum_of_presses_wraps() {
        let mut bench = Bench::new(CounterConfig::default());
        bench.press(0b1000);
        bench.release();

        assert_eq!(bench.press(0b1100), Some(EdgeOutcome::Applied { display: 4 }));
    }

    #[test]
    fn release_edge_adds_nothing() {
        let mut bench = Bench::new(CounterConfig::default());
        bench.press(0b0100);

        assert_eq!(bench.release(), Some(EdgeOutcome::Applied { display: 4 }));
        assert_eq!(bench.state().last_input(), 0);
    }

    #[test]
    fn reset_button_clears_display() {
        let mut bench = Bench::new(CounterConfig::default());
        bench.press(0b1000);
        bench.release();
        bench.ticks(24);
        assert_eq!(bench.state().display_count(), 9);

        assert_eq!(bench.press(RESET_BUTTON), Some(EdgeOutcome::Applied { display: 0 }));
        assert_eq!(bench.shown(), Some(0));
        assert!(bench.buttons_armed());
    }

    #[test]
    fn reset_button_can_be_unassigned() {
        let config = CounterConfig {
            reset_button: None,
            ..CounterConfig::default()
        };
        let mut bench = Bench::new(config);

        assert_eq!(bench.press(RESET_BUTTON), Some(EdgeOutcome::Applied { display: 1 }));
    }

    #[test]
    fn increment_button_adds_while_disabled() {
        let mut bench = Bench::new(CounterConfig::default());

        assert_eq!(bench.press(INCREMENT_BUTTON), Some(EdgeOutcome::Applied { display: 2 }));
        assert_eq!(bench.state().threshold(), DEFAULT_THRESHOLD);
        assert!(!bench.state().debounce().is_debouncing());
    }

    #[test]
    fn held_increment_raises_threshold() {
        let mut bench = Bench::with_increment_enabled();

        assert_eq!(bench.press(INCREMENT_BUTTON), Some(EdgeOutcome::Debouncing));
        assert!(!bench.buttons_armed());

        assert_eq!(bench.tick(), serviced(DebounceVerdict::Pending));
        assert_eq!(bench.tick(), serviced(DebounceVerdict::Confirmed));
        assert_eq!(bench.state().threshold(), DEFAULT_THRESHOLD + 1);
        assert!(bench.buttons_armed());
        assert_eq!(bench.shown(), Some(0));
    }

    #[test]
    fn raised_threshold_slows_rollover() {
        let mut bench = Bench::new(CounterConfig::default());
        bench.run(&[
            Stimulus::Switches(SWITCH_ENABLE_INCREMENT),
            Stimulus::Press(INCREMENT_BUTTON),
            Stimulus::Ticks(2),
            Stimulus::Release,
        ]);
        assert_eq!(bench.state().threshold(), 4);
        assert_eq!(bench.ticks_until_rollover(), Some(30));
    }

    #[test]
    fn transient_increment_press_is_rejected() {
        let mut bench = Bench::with_increment_enabled();
        bench.press(INCREMENT_BUTTON);

        // Release lands while the edge interrupt is masked
        assert_eq!(bench.release(), None);
        assert_eq!(bench.masked_edges(), 1);

        assert_eq!(bench.tick(), serviced(DebounceVerdict::Pending));
        assert_eq!(bench.tick(), serviced(DebounceVerdict::Cancelled));
        assert_eq!(bench.state().threshold(), DEFAULT_THRESHOLD);
        assert!(bench.buttons_armed());
    }

    #[test]
    fn increment_caps_at_max_then_adds() {
        let mut bench = Bench::with_increment_enabled();
        for expected in DEFAULT_THRESHOLD + 1..=MAX_THRESHOLD {
            assert_eq!(bench.press(INCREMENT_BUTTON), Some(EdgeOutcome::Debouncing));
            bench.ticks(2);
            bench.release();
            assert_eq!(bench.state().threshold(), expected);
        }

        assert_eq!(bench.press(INCREMENT_BUTTON), Some(EdgeOutcome::Applied { display: 2 }));
        assert_eq!(bench.state().threshold(), MAX_THRESHOLD);
    }

    #[test]
    fn clearing_increment_flag_cancels_debounce() {
        let mut bench = Bench::with_increment_enabled();
        bench.press(INCREMENT_BUTTON);

        let update = bench.set_switches(0);
        assert_eq!(update.increment, Some(false));
        assert!(!update.enable_buttons);

        assert_eq!(bench.tick(), serviced(DebounceVerdict::Cancelled));
        assert_eq!(bench.state().threshold(), DEFAULT_THRESHOLD);
        assert!(bench.buttons_armed());
    }

    #[test]
    fn retain_policy_waits_out_a_bounce() {
        let config = CounterConfig {
            release_policy: ReleasePolicy::Retain,
            ..CounterConfig::default()
        };
        let mut bench = Bench::new(config);
        bench.set_switches(SWITCH_ENABLE_INCREMENT);
        bench.press(INCREMENT_BUTTON);
        bench.release();

        assert_eq!(bench.tick(), serviced(DebounceVerdict::Pending));
        assert_eq!(bench.tick(), serviced(DebounceVerdict::Pending));
        assert!(bench.state().debounce().is_debouncing());

        assert_eq!(bench.press(INCREMENT_BUTTON), None);
        assert_eq!(bench.tick(), serviced(DebounceVerdict::Confirmed));
        assert_eq!(bench.state().threshold(), DEFAULT_THRESHOLD + 1);
        assert_eq!(bench.masked_edges(), 2);
    }

    #[test]
    fn spurious_edge_leaves_source_masked() {
        let mut bench = Bench::new(CounterConfig::default());
        let writes = bench.peripherals.display.writes().len();
        let before = *bench.state();

        assert_eq!(bench.spurious_edge(), EdgeOutcome::Spurious);
        assert_eq!(*bench.state(), before);
        assert_eq!(bench.peripherals.display.writes().len(), writes);
        assert!(!bench.buttons_armed());

        bench.ticks(3);
        assert!(!bench.buttons_armed());
    }

    #[test]
    fn disable_switch_resets_and_masks() {
        let mut bench = Bench::with_increment_enabled();
        bench.press(INCREMENT_BUTTON);
        bench.ticks(2);
        bench.release();
        bench.press(0b0100);
        assert_eq!(bench.state().threshold(), 4);
        assert_eq!(bench.state().display_count(), 4);

        let update = bench.set_switches(SWITCH_DISABLE_BUTTONS);
        assert!(update.disable_and_reset);
        assert_eq!(bench.state().threshold(), DEFAULT_THRESHOLD);
        assert_eq!(bench.state().display_count(), 0);
        assert_eq!(bench.shown(), Some(0));
        assert!(!bench.buttons_armed());
        assert!(!bench.flags.buttons_enabled());
        assert!(!bench.flags.increment_enabled());
    }

    #[test]
    fn disable_switch_is_idempotent() {
        let mut bench = Bench::new(CounterConfig::default());
        bench.press(0b0100);
        bench.set_switches(SWITCH_DISABLE_BUTTONS);
        let writes = bench.peripherals.display.writes().len();
        let state = *bench.state();

        for _ in 0..5 {
            let update = bench.poll_mode();
            assert!(!update.changed);
            assert!(update.disable_and_reset);
        }
        assert_eq!(*bench.state(), state);
        assert_eq!(bench.peripherals.display.writes().len(), writes);
    }

    #[test]
    fn disable_switch_cancels_debounce() {
        let mut bench = Bench::with_increment_enabled();
        bench.press(INCREMENT_BUTTON);
        bench.set_switches(SWITCH_DISABLE_BUTTONS | SWITCH_ENABLE_INCREMENT);

        assert!(!bench.state().debounce().is_debouncing());
        assert_eq!(bench.tick(), serviced(DebounceVerdict::Idle));
        assert!(!bench.buttons_armed());
    }

    #[test]
    fn presses_ignored_until_disable_switch_released() {
        let mut bench = Bench::new(CounterConfig::default());
        bench.set_switches(SWITCH_DISABLE_BUTTONS);

        assert_eq!(bench.press(0b0100), None);
        assert_eq!(bench.state().display_count(), 0);

        let update = bench.set_switches(0);
        assert!(update.enable_buttons);
        assert!(bench.buttons_armed());
        assert!(bench.flags.buttons_enabled());

        assert_eq!(bench.press(0b1000), Some(EdgeOutcome::Applied { display: 8 }));
    }

    #[test]
    fn ticks_keep_running_while_buttons_disabled() {
        let mut bench = Bench::new(CounterConfig::default());
        bench.set_switches(SWITCH_DISABLE_BUTTONS);

        assert_eq!(bench.ticks(48), 2);
        assert_eq!(bench.shown(), Some(2));
    }

    #[test]
    fn partial_increment_mask_leaves_flag_unchanged() {
        let config = CounterConfig {
            enable_increment_switch: 0b0110,
            ..CounterConfig::default()
        };
        let mut bench = Bench::new(config);
        bench.set_switches(0b0110);
        assert!(bench.flags.increment_enabled());

        let update = bench.set_switches(0b0100);
        assert_eq!(update.increment, None);
        assert!(bench.flags.increment_enabled());

        bench.set_switches(0);
        assert!(!bench.flags.increment_enabled());
    }
}
