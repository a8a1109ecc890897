#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Telemetry intake that normalizes and timestamps raw collaborator input.

use puzzle_director_core::{
    unit, ConfigError, Event, PuzzleAttempt, RawPuzzleOutcome, RawTelemetry, SessionTime,
    TelemetryReading, MAX_DIFFICULTY, MIN_DIFFICULTY,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tuning knobs for telemetry normalization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Raw movement intensity mapped to 1.0; larger readings saturate.
    pub max_movement_intensity: f32,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            max_movement_intensity: 1.0,
        }
    }
}

impl TelemetryConfig {
    /// Rejects settings the sink cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_movement_intensity.is_finite() && self.max_movement_intensity > 0.0) {
            return Err(ConfigError::Zero {
                field: "telemetry.max_movement_intensity",
            });
        }
        Ok(())
    }
}

/// Counters describing what the sink has accepted so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SinkStats {
    /// Telemetry samples accepted.
    pub samples: u64,
    /// Puzzle outcomes accepted.
    pub outcomes: u64,
    /// Individual values that had to be clamped or replaced.
    pub sanitized_values: u64,
}

/// Pure system that converts raw telemetry events into normalized readings.
#[derive(Debug)]
pub struct TelemetrySink {
    max_movement_intensity: f32,
    stats: SinkStats,
}

impl TelemetrySink {
    /// Creates a sink using the supplied configuration.
    #[must_use]
    pub fn new(config: &TelemetryConfig) -> Self {
        let max_movement_intensity = if config.max_movement_intensity > 0.0 {
            config.max_movement_intensity
        } else {
            1.0
        };
        Self {
            max_movement_intensity,
            stats: SinkStats::default(),
        }
    }

    /// Consumes world events and emits normalized readings and attempts.
    pub fn handle(
        &mut self,
        events: &[Event],
        out_readings: &mut Vec<TelemetryReading>,
        out_attempts: &mut Vec<PuzzleAttempt>,
    ) {
        for event in events {
            match event {
                Event::TelemetryReceived { telemetry, at } => {
                    out_readings.push(self.ingest_sample(*telemetry, *at));
                }
                Event::OutcomeReported { outcome, at } => {
                    out_attempts.push(self.ingest_outcome(*outcome, *at));
                }
                _ => {}
            }
        }
    }

    /// Normalizes a continuous telemetry sample.
    pub fn ingest_sample(&mut self, raw: RawTelemetry, at: SessionTime) -> TelemetryReading {
        let movement = self.sanitize(raw.movement_intensity / self.max_movement_intensity);
        let interaction = self.sanitize(raw.interaction_frequency);
        let progress = self.sanitize(raw.puzzle_progress);
        self.stats.samples = self.stats.samples.saturating_add(1);

        TelemetryReading {
            timestamp: at,
            movement_intensity: movement,
            interaction_frequency: interaction,
            puzzle_progress: progress,
            active_puzzle_count: raw.active_puzzle_count,
        }
    }

    /// Normalizes a puzzle outcome.
    pub fn ingest_outcome(&mut self, raw: RawPuzzleOutcome, at: SessionTime) -> PuzzleAttempt {
        let completion_time_secs = if raw.completion_time_secs.is_finite() {
            raw.completion_time_secs.max(0.0)
        } else {
            0.0
        };
        let difficulty = if raw.difficulty_at_attempt.is_finite() {
            raw.difficulty_at_attempt
                .clamp(f32::from(MIN_DIFFICULTY), f32::from(MAX_DIFFICULTY))
        } else {
            f32::from(MIN_DIFFICULTY)
        };
        if completion_time_secs != raw.completion_time_secs
            || difficulty != raw.difficulty_at_attempt
        {
            self.stats.sanitized_values = self.stats.sanitized_values.saturating_add(1);
            debug!(
                category = raw.category.label(),
                "puzzle outcome clamped into valid range"
            );
        }
        self.stats.outcomes = self.stats.outcomes.saturating_add(1);

        PuzzleAttempt {
            timestamp: at,
            category: raw.category,
            player: raw.player,
            success: raw.success,
            completion_time_secs,
            difficulty,
        }
    }

    /// Counters accumulated since construction.
    #[must_use]
    pub fn stats(&self) -> SinkStats {
        self.stats
    }

    fn sanitize(&mut self, value: f32) -> f32 {
        let clamped = unit(value);
        if clamped != value {
            self.stats.sanitized_values = self.stats.sanitized_values.saturating_add(1);
        }
        clamped
    }
}

impl Default for TelemetrySink {
    fn default() -> Self {
        Self::new(&TelemetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::{TelemetryConfig, TelemetrySink};
    use puzzle_director_core::{RawTelemetry, SessionTime};

    #[test]
    fn movement_is_scaled_by_configured_maximum() {
        let mut sink = TelemetrySink::new(&TelemetryConfig {
            max_movement_intensity: 4.0,
        });
        let reading = sink.ingest_sample(
            RawTelemetry {
                movement_intensity: 2.0,
                interaction_frequency: 0.5,
                puzzle_progress: 0.25,
                active_puzzle_count: 2,
            },
            SessionTime::from_secs(1),
        );
        assert!((reading.movement_intensity - 0.5).abs() < f32::EPSILON);
        assert_eq!(sink.stats().sanitized_values, 0);
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let config = TelemetryConfig {
            max_movement_intensity: 0.0,
        };
        assert!(config.validate().is_err());
        assert!(TelemetryConfig::default().validate().is_ok());
    }
}
