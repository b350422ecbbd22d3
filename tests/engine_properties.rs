use interval_timer::state::{IntervalTimer, Settings};
use proptest::prelude::*;

const MINUTE: u64 = 60_000;

fn timer(minutes: u32, intervals: u32) -> IntervalTimer {
    IntervalTimer::new(Settings::new(minutes, intervals).expect("valid settings"))
}

proptest! {
    #[test]
    fn elapsed_is_monotonic_while_running(
        minutes in 1u32..30,
        intervals in 1u32..=10,
        steps in prop::collection::vec(0u64..20 * MINUTE, 1..60),
    ) {
        let mut timer = timer(minutes, intervals);
        timer.start(0);

        let mut now = 0;
        let mut last_elapsed = 0;
        for step in steps {
            now += step;
            timer.tick(now);
            let state = timer.state();
            prop_assert!(state.total_elapsed_ms >= last_elapsed);
            prop_assert!(state.time_remaining_ms <= state.interval_duration_ms);
            prop_assert!(state.current_interval <= state.total_intervals);
            prop_assert!(state.completed_intervals.len() as u32 <= state.total_intervals);
            last_elapsed = state.total_elapsed_ms;
        }
    }

    #[test]
    fn tick_cadence_does_not_change_outcome(
        minutes in 1u32..5,
        intervals in 1u32..=4,
        end in 0u64..25 * MINUTE,
        cadence in 1_000u64..120_000,
    ) {
        let mut sparse = timer(minutes, intervals);
        sparse.start(0);
        let sparse_events = sparse.tick(end);

        let mut dense = timer(minutes, intervals);
        dense.start(0);
        let mut dense_events = Vec::new();
        let mut now = 0;
        while now < end {
            now = (now + cadence).min(end);
            dense_events.extend(dense.tick(now));
        }
        // duplicate tick at the same instant
        dense_events.extend(dense.tick(end));

        prop_assert_eq!(sparse.state(), dense.state());
        prop_assert_eq!(sparse_events, dense_events);
    }

    #[test]
    fn completion_history_is_ordered_and_unique(
        minutes in 1u32..5,
        intervals in 1u32..=10,
        checkpoints in prop::collection::vec(0u64..10 * MINUTE, 1..20),
    ) {
        let mut timer = timer(minutes, intervals);
        timer.start(0);
        let mut now = 0;
        let mut emitted = 0;
        for step in checkpoints {
            now += step;
            emitted += timer.tick(now).len();
        }

        let state = timer.state();
        prop_assert_eq!(emitted, state.completed_intervals.len());
        for (index, completed) in state.completed_intervals.iter().enumerate() {
            prop_assert_eq!(completed.interval, index as u32 + 1);
            prop_assert_eq!(completed.completed_at, (index as u64 + 1) * u64::from(minutes) * MINUTE);
        }
        if state.is_complete() {
            prop_assert!(!state.is_running);
            prop_assert_eq!(state.time_remaining_ms, 0);
        }
    }

    #[test]
    fn pausing_excludes_paused_time(
        run_before in 0u64..MINUTE,
        paused_for in 0u64..100 * MINUTE,
        run_after in 0u64..MINUTE,
    ) {
        // 5 minute interval: no boundary is crossed within two runs under a minute
        let mut timer = timer(5, 1);
        timer.start(0);
        timer.pause(run_before);
        timer.tick(run_before + paused_for / 2);
        timer.start(run_before + paused_for);
        timer.tick(run_before + paused_for + run_after);

        prop_assert_eq!(timer.state().time_remaining_ms, 5 * MINUTE - run_before - run_after);
    }
}
