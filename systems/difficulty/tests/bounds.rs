use std::time::Duration;

use proptest::prelude::*;
use puzzle_director_system_difficulty::{DifficultyConfig, DifficultyController};

proptest! {
    #[test]
    fn current_stays_within_bounds_for_any_tick_sequence(
        min in 1.0f32..5.0,
        span in 0.0f32..5.0,
        initial in -20.0f32..20.0,
        ticks in proptest::collection::vec((-1.0f32..2.0, 0u64..5_000), 0..200),
    ) {
        let max = min + span;
        let mut controller = DifficultyController::new(&DifficultyConfig {
            min,
            max,
            initial,
            ..DifficultyConfig::default()
        });
        for (performance, millis) in ticks {
            let _ = controller.tick(performance, Duration::from_millis(millis));
            prop_assert!(controller.current() >= min && controller.current() <= max);
            prop_assert!(controller.target() >= min && controller.target() <= max);
        }
    }
}

#[test]
fn oscillating_performance_moves_target_both_ways() {
    let mut controller = DifficultyController::default();
    let mut seen_up = false;
    let mut seen_down = false;
    let mut last_target = controller.target();
    for cycle in 0..40 {
        let performance = if (cycle / 5) % 2 == 0 { 0.95 } else { 0.05 };
        let _ = controller.tick(performance, Duration::from_secs(2));
        if controller.target() > last_target {
            seen_up = true;
        }
        if controller.target() < last_target {
            seen_down = true;
        }
        last_target = controller.target();
    }
    assert!(seen_up && seen_down);
}
