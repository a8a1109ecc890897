//! Pure score computations over telemetry signals.
//!
//! Every function consumes an iterator in a single pass and degrades to a
//! neutral value when too few signals are supplied.

use puzzle_director_core::{unit, PerformanceSample, TelemetryReading};

/// Number of newest signals considered by engagement and frustration.
pub const RECENT_SIGNALS: usize = 10;
/// Minimum signals required before engagement is computed.
pub const ENGAGEMENT_MIN_SIGNALS: usize = 5;
/// Minimum signals required before frustration is computed.
pub const FRUSTRATION_MIN_SIGNALS: usize = 10;
/// Engagement reported while history is insufficient.
pub const NEUTRAL_ENGAGEMENT: f32 = 0.5;
/// Frustration reported while history is insufficient.
pub const NEUTRAL_FRUSTRATION: f32 = 0.0;

/// Raw behavioural signals shared by samples and readings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Signals {
    /// Normalized movement intensity.
    pub movement: f32,
    /// Interaction frequency.
    pub interaction: f32,
    /// Puzzle progress.
    pub progress: f32,
}

impl From<&PerformanceSample> for Signals {
    fn from(sample: &PerformanceSample) -> Self {
        Self {
            movement: sample.movement_intensity(),
            interaction: sample.interaction_frequency(),
            progress: sample.puzzle_progress(),
        }
    }
}

impl From<&TelemetryReading> for Signals {
    fn from(reading: &TelemetryReading) -> Self {
        Self {
            movement: unit(reading.movement_intensity),
            interaction: unit(reading.interaction_frequency),
            progress: unit(reading.puzzle_progress),
        }
    }
}

/// Weighted blend of movement (30%), interaction (40%) and progress (30%) averages.
///
/// Returns [`NEUTRAL_ENGAGEMENT`] with fewer than [`ENGAGEMENT_MIN_SIGNALS`] signals.
pub fn engagement<I>(signals: I) -> f32
where
    I: IntoIterator<Item = Signals>,
{
    let mut count = 0usize;
    let (mut movement, mut interaction, mut progress) = (0.0f32, 0.0f32, 0.0f32);
    for signal in signals {
        count += 1;
        movement += signal.movement;
        interaction += signal.interaction;
        progress += signal.progress;
    }

    if count < ENGAGEMENT_MIN_SIGNALS {
        return NEUTRAL_ENGAGEMENT;
    }

    let n = count as f32;
    unit(movement / n * 0.3 + interaction / n * 0.4 + progress / n * 0.3)
}

/// Share of stalled signals, weighted by how badly they stalled.
///
/// Progress below 0.1 weighs 40%, progress below 0.3 weighs 30% and
/// interaction below 0.2 weighs 30%. Returns [`NEUTRAL_FRUSTRATION`] with
/// fewer than [`FRUSTRATION_MIN_SIGNALS`] signals.
pub fn frustration<I>(signals: I) -> f32
where
    I: IntoIterator<Item = Signals>,
{
    let mut count = 0usize;
    let (mut stalled, mut slow, mut idle) = (0usize, 0usize, 0usize);
    for signal in signals {
        count += 1;
        if signal.progress < 0.1 {
            stalled += 1;
        }
        if signal.progress < 0.3 {
            slow += 1;
        }
        if signal.interaction < 0.2 {
            idle += 1;
        }
    }

    if count < FRUSTRATION_MIN_SIGNALS {
        return NEUTRAL_FRUSTRATION;
    }

    let n = count as f32;
    unit(stalled as f32 / n * 0.4 + slow as f32 / n * 0.3 + idle as f32 / n * 0.3)
}

/// Mean and population variance of a series.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Spread {
    /// Arithmetic mean, zero for an empty series.
    pub mean: f32,
    /// Population variance, zero for an empty series.
    pub variance: f32,
}

/// Computes mean and population variance in a single pass (Welford).
pub fn spread<I>(values: I) -> Spread
where
    I: IntoIterator<Item = f32>,
{
    let mut count = 0u32;
    let mut mean = 0.0f64;
    let mut m2 = 0.0f64;
    for value in values {
        count += 1;
        let value = f64::from(value);
        let delta = value - mean;
        mean += delta / f64::from(count);
        m2 += delta * (value - mean);
    }

    if count == 0 {
        return Spread::default();
    }

    Spread {
        mean: mean as f32,
        variance: (m2 / f64::from(count)) as f32,
    }
}

/// Arithmetic mean, zero for an empty series.
pub fn mean<I>(values: I) -> f32
where
    I: IntoIterator<Item = f32>,
{
    spread(values).mean
}
