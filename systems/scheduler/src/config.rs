use std::time::Duration;

use puzzle_director_core::ConfigError;
use puzzle_director_system_analytics::AnalyticsConfig;
use puzzle_director_system_content_generation::GenerationConfig;
use puzzle_director_system_difficulty::DifficultyConfig;
use puzzle_director_system_puzzle_selection::SelectorConfig;
use puzzle_director_system_telemetry::TelemetryConfig;
use puzzle_director_system_validation::ValidationConfig;
use serde::{Deserialize, Serialize};

/// Longest interval or timeout accepted, one day of session time.
pub const MAX_INTERVAL_SECS: f64 = 86_400.0;

/// Periodic task intervals and session-wide settings, in session seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Interval of trend and behavior detection.
    pub analytics_interval_secs: f64,
    /// Interval of the difficulty control step.
    pub difficulty_interval_secs: f64,
    /// Interval at which scheduled generation is considered.
    pub generation_interval_secs: f64,
    /// Age after which an unfinished generation job is abandoned.
    pub generation_timeout_secs: f64,
    /// Rooms held by the content pool.
    pub pool_capacity: usize,
    /// Seed every random stream of the session derives from.
    pub session_seed: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            analytics_interval_secs: 1.0,
            difficulty_interval_secs: 2.0,
            generation_interval_secs: 30.0,
            generation_timeout_secs: 10.0,
            pool_capacity: 10,
            session_seed: 0,
        }
    }
}

impl SchedulerConfig {
    /// Rejects intervals outside `(0, MAX_INTERVAL_SECS]` and an empty pool.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let _ = self.analytics_interval()?;
        let _ = self.difficulty_interval()?;
        let _ = self.generation_interval()?;
        let _ = self.generation_timeout()?;
        if self.pool_capacity == 0 {
            return Err(ConfigError::Zero {
                field: "scheduler.pool_capacity",
            });
        }
        Ok(())
    }

    pub(crate) fn analytics_interval(&self) -> Result<Duration, ConfigError> {
        seconds("scheduler.analytics_interval_secs", self.analytics_interval_secs)
    }

    pub(crate) fn difficulty_interval(&self) -> Result<Duration, ConfigError> {
        seconds("scheduler.difficulty_interval_secs", self.difficulty_interval_secs)
    }

    pub(crate) fn generation_interval(&self) -> Result<Duration, ConfigError> {
        seconds("scheduler.generation_interval_secs", self.generation_interval_secs)
    }

    pub(crate) fn generation_timeout(&self) -> Result<Duration, ConfigError> {
        seconds("scheduler.generation_timeout_secs", self.generation_timeout_secs)
    }
}

fn seconds(field: &'static str, value: f64) -> Result<Duration, ConfigError> {
    if value.is_nan() || value <= 0.0 {
        return Err(ConfigError::Zero { field });
    }
    let out_of_range = ConfigError::OutOfRange {
        field,
        value,
        min: 0.0,
        max: MAX_INTERVAL_SECS,
    };
    if value > MAX_INTERVAL_SECS {
        return Err(out_of_range);
    }
    Duration::try_from_secs_f64(value).map_err(|_| out_of_range)
}

/// Complete director configuration, one table per component.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    /// Telemetry normalization.
    pub telemetry: TelemetryConfig,
    /// Performance analysis.
    pub analytics: AnalyticsConfig,
    /// Difficulty control loop.
    pub difficulty: DifficultyConfig,
    /// Puzzle category weighting.
    pub selection: SelectorConfig,
    /// Room generation.
    pub generation: GenerationConfig,
    /// Room validation.
    pub validation: ValidationConfig,
    /// Task scheduling.
    pub scheduler: SchedulerConfig,
}

impl DirectorConfig {
    /// Validates every component table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.telemetry.validate()?;
        self.analytics.validate()?;
        self.difficulty.validate()?;
        self.selection.validate()?;
        self.generation.validate()?;
        self.validation.validate()?;
        self.scheduler.validate()
    }
}
