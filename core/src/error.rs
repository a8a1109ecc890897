use thiserror::Error;

/// Reasons a director configuration may be rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A lower bound exceeds its matching upper bound.
    #[error("{field}: minimum {min} exceeds maximum {max}")]
    InvertedBounds {
        /// Name of the offending setting.
        field: &'static str,
        /// Configured minimum.
        min: f64,
        /// Configured maximum.
        max: f64,
    },
    /// A value lies outside the range the engine can express.
    #[error("{field}: {value} is outside {min}..={max}")]
    OutOfRange {
        /// Name of the offending setting.
        field: &'static str,
        /// Configured value.
        value: f64,
        /// Smallest permitted value.
        min: f64,
        /// Largest permitted value.
        max: f64,
    },
    /// Puzzle base weights do not form a probability distribution.
    #[error("puzzle base weights must sum to 1, got {sum}")]
    WeightsNotNormalized {
        /// Sum of the configured weights.
        sum: f64,
    },
    /// A weight or multiplier is negative or not finite.
    #[error("{field}: weights and multipliers must be finite and non-negative, got {value}")]
    InvalidWeight {
        /// Name of the offending setting.
        field: &'static str,
        /// Configured value.
        value: f64,
    },
    /// A capacity or interval must be non-zero.
    #[error("{field} must be greater than zero")]
    Zero {
        /// Name of the offending setting.
        field: &'static str,
    },
}
