#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Control loop that smooths difficulty toward a performance-driven target.

use std::time::Duration;

use puzzle_director_core::{
    ConfigError, DifficultyChange, DifficultyState, MAX_DIFFICULTY, MIN_DIFFICULTY,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Tuning knobs for the difficulty control loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Lowest difficulty the loop may reach.
    pub min: f32,
    /// Highest difficulty the loop may reach.
    pub max: f32,
    /// Difficulty at session start.
    pub initial: f32,
    /// Average performance below which the target is lowered.
    pub low_threshold: f32,
    /// Average performance above which the target is raised.
    pub high_threshold: f32,
    /// Amount the target moves per adjustment.
    pub step: f32,
    /// Exponential smoothing rate per second.
    pub smoothing_rate: f32,
    /// Smallest per-tick movement that produces a change notification.
    pub epsilon: f32,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            min: f32::from(MIN_DIFFICULTY),
            max: f32::from(MAX_DIFFICULTY),
            initial: 5.0,
            low_threshold: 0.3,
            high_threshold: 0.8,
            step: 0.5,
            smoothing_rate: 0.5,
            epsilon: 0.1,
        }
    }
}

impl DifficultyConfig {
    /// Rejects settings the controller cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let global_min = f64::from(MIN_DIFFICULTY);
        let global_max = f64::from(MAX_DIFFICULTY);
        for (field, value) in [("difficulty.min", self.min), ("difficulty.max", self.max)] {
            let value = f64::from(value);
            if !(global_min..=global_max).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    field,
                    value,
                    min: global_min,
                    max: global_max,
                });
            }
        }
        if self.min > self.max {
            return Err(ConfigError::InvertedBounds {
                field: "difficulty",
                min: f64::from(self.min),
                max: f64::from(self.max),
            });
        }
        if self.low_threshold > self.high_threshold {
            return Err(ConfigError::InvertedBounds {
                field: "difficulty.thresholds",
                min: f64::from(self.low_threshold),
                max: f64::from(self.high_threshold),
            });
        }
        for (field, value) in [
            ("difficulty.step", self.step),
            ("difficulty.smoothing_rate", self.smoothing_rate),
            ("difficulty.epsilon", self.epsilon),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    field,
                    value: f64::from(value),
                });
            }
        }
        Ok(())
    }
}

/// Conceptual state of the control loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DifficultyPhase {
    /// The smoothed value sits within epsilon of the target.
    Stable,
    /// The smoothed value is still converging on the target.
    Adjusting,
}

/// Pure control loop owning the session's [`DifficultyState`].
#[derive(Debug)]
pub struct DifficultyController {
    state: DifficultyState,
    low_threshold: f32,
    high_threshold: f32,
    step: f32,
    smoothing_rate: f32,
    epsilon: f32,
}

impl DifficultyController {
    /// Creates a controller whose current and target start at `config.initial`.
    #[must_use]
    pub fn new(config: &DifficultyConfig) -> Self {
        let (min, max) = if config.min <= config.max {
            (config.min, config.max)
        } else {
            (config.max, config.min)
        };
        let initial = clamp_finite(config.initial, min, max);
        Self {
            state: DifficultyState {
                current: initial,
                target: initial,
                min,
                max,
            },
            low_threshold: config.low_threshold,
            high_threshold: config.high_threshold,
            step: config.step.max(0.0),
            smoothing_rate: config.smoothing_rate.max(0.0),
            epsilon: config.epsilon.max(0.0),
        }
    }

    /// Runs one adjustment step.
    ///
    /// `average_performance` is clamped into `[0, 1]`. The target moves by one
    /// step when performance leaves the threshold band, then the smoothed value
    /// moves toward the target. A change is returned only when the smoothed
    /// value moved by more than epsilon during this tick.
    pub fn tick(&mut self, average_performance: f32, dt: Duration) -> Option<DifficultyChange> {
        let performance = clamp_finite(average_performance, 0.0, 1.0);
        let previous_target = self.state.target;
        if performance < self.low_threshold {
            self.state.target = (self.state.target - self.step).max(self.state.min);
        } else if performance > self.high_threshold {
            self.state.target = (self.state.target + self.step).min(self.state.max);
        }
        if self.state.target != previous_target {
            debug!(
                performance,
                from = previous_target,
                to = self.state.target,
                "difficulty target adjusted"
            );
        }

        let previous = self.state.current;
        let factor = (self.smoothing_rate * dt.as_secs_f32()).min(1.0);
        let next = previous + (self.state.target - previous) * factor;
        self.state.current = clamp_finite(next, self.state.min, self.state.max);

        let moved = (self.state.current - previous).abs();
        if moved > self.epsilon {
            let change = DifficultyChange {
                previous,
                current: self.state.current,
            };
            info!(previous, current = change.current, "difficulty changed");
            Some(change)
        } else {
            None
        }
    }

    /// Smoothed difficulty read by downstream consumers.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.state.current
    }

    /// Goal the smoothed value moves toward.
    #[must_use]
    pub const fn target(&self) -> f32 {
        self.state.target
    }

    /// Copy of the full controller state.
    #[must_use]
    pub const fn state(&self) -> DifficultyState {
        self.state
    }

    /// Whether the loop has settled on its target.
    #[must_use]
    pub fn phase(&self) -> DifficultyPhase {
        if (self.state.current - self.state.target).abs() <= self.epsilon {
            DifficultyPhase::Stable
        } else {
            DifficultyPhase::Adjusting
        }
    }
}

impl Default for DifficultyController {
    fn default() -> Self {
        Self::new(&DifficultyConfig::default())
    }
}

fn clamp_finite(value: f32, min: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::{DifficultyConfig, DifficultyController, DifficultyPhase};
    use std::time::Duration;

    const TWO_SECONDS: Duration = Duration::from_secs(2);

    #[test]
    fn neutral_performance_leaves_difficulty_stable() {
        let mut controller = DifficultyController::default();
        assert!(controller.tick(0.5, TWO_SECONDS).is_none());
        assert_eq!(controller.current(), 5.0);
        assert_eq!(controller.phase(), DifficultyPhase::Stable);
    }

    #[test]
    fn high_performance_raises_target_and_notifies() {
        let mut controller = DifficultyController::default();
        let change = controller
            .tick(0.95, TWO_SECONDS)
            .expect("full smoothing step moves by the whole step");
        assert_eq!(change.previous, 5.0);
        assert!((change.current - 5.5).abs() < 1e-6);
        assert!((controller.target() - 5.5).abs() < 1e-6);
    }

    #[test]
    fn small_moves_do_not_notify() {
        let mut controller = DifficultyController::default();
        let change = controller.tick(0.1, Duration::from_millis(200));
        assert!(change.is_none(), "moved only 0.05");
        assert_eq!(controller.phase(), DifficultyPhase::Adjusting);
        assert!((controller.target() - 4.5).abs() < 1e-6);
        assert!(controller.current() < 5.0);
    }

    #[test]
    fn target_is_bounded_at_configured_minimum() {
        let mut controller = DifficultyController::new(&DifficultyConfig {
            min: 3.0,
            max: 8.0,
            initial: 3.2,
            ..DifficultyConfig::default()
        });
        for _ in 0..10 {
            let _ = controller.tick(0.0, TWO_SECONDS);
        }
        assert_eq!(controller.target(), 3.0);
        assert_eq!(controller.current(), 3.0);
    }

    #[test]
    fn invalid_bounds_are_rejected() {
        let inverted = DifficultyConfig {
            min: 7.0,
            max: 2.0,
            ..DifficultyConfig::default()
        };
        assert!(inverted.validate().is_err());
        let outside = DifficultyConfig {
            max: 12.0,
            ..DifficultyConfig::default()
        };
        assert!(outside.validate().is_err());
        assert!(DifficultyConfig::default().validate().is_ok());
    }
}
