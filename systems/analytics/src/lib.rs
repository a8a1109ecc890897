#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Performance analysis system that turns telemetry into player signals.
//!
//! The analyzer keeps a bounded window of [`PerformanceSample`] values and
//! per-category attempt statistics. Scores degrade to documented neutral
//! defaults whenever history is insufficient; nothing here fails.

mod detection;
pub mod metrics;
mod skill;

use std::collections::BTreeMap;

use puzzle_director_core::{
    unit, BehaviorPatternKind, ConfigError, Event, InsightKind, PerformanceSample,
    PerformanceSnapshot, PuzzleAttempt, PuzzleCategory, RollingWindow, SessionTime,
    TelemetryReading,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::detection::Cooldowns;
use crate::metrics::Signals;

pub use detection::{Trend, PATTERN_MIN_SAMPLES, TREND_HALF_WINDOW, TREND_MIN_SAMPLES};
pub use skill::{
    CategoryStats, SkillProfile, MIN_ATTEMPTS_FOR_SKILL, NEUTRAL_SKILL,
    TIME_EFFICIENCY_HORIZON_SECS,
};

/// Entries kept per category when tracking difficulty progression.
pub const DIFFICULTY_PROGRESSION_CAPACITY: usize = 20;
/// Outcomes considered by the recent success rate.
pub const RECENT_OUTCOMES: usize = 20;
/// Mastery reported when no category has enough attempts.
pub const NEUTRAL_MASTERY: f32 = 0.5;
/// Success rate reported before any attempt is recorded.
pub const NEUTRAL_SUCCESS_RATE: f32 = 0.5;

/// Depth of analysis, which fixes the rolling window capacity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisTier {
    /// Short memory; trends and patterns never accumulate enough samples.
    Light,
    /// Balanced memory suitable for most sessions.
    #[default]
    Standard,
    /// Long memory for offline analysis.
    Deep,
}

impl AnalysisTier {
    /// Rolling window capacity associated with the tier.
    #[must_use]
    pub const fn window_capacity(self) -> usize {
        match self {
            Self::Light => 20,
            Self::Standard => 200,
            Self::Deep => 1_000,
        }
    }
}

/// Analyzer configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Analysis tier used when no explicit capacity is given.
    pub tier: AnalysisTier,
    /// Explicit rolling window capacity overriding the tier.
    pub window_capacity: Option<usize>,
}

impl AnalyticsConfig {
    /// Effective rolling window capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.window_capacity
            .unwrap_or_else(|| self.tier.window_capacity())
    }

    /// Rejects settings the analyzer cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity() == 0 {
            return Err(ConfigError::Zero {
                field: "analytics.window_capacity",
            });
        }
        Ok(())
    }
}

/// Pure analysis system that maintains player performance history.
#[derive(Debug)]
pub struct PerformanceAnalyzer {
    samples: RollingWindow<PerformanceSample>,
    category_stats: BTreeMap<PuzzleCategory, CategoryStats>,
    difficulty_progression: BTreeMap<PuzzleCategory, RollingWindow<f32>>,
    recent_outcomes: RollingWindow<bool>,
    skills: SkillProfile,
    attempt_count: usize,
    insight_cooldowns: Cooldowns<InsightKind>,
    pattern_cooldowns: Cooldowns<BehaviorPatternKind>,
}

impl PerformanceAnalyzer {
    /// Creates an analyzer with an empty history.
    #[must_use]
    pub fn new(config: &AnalyticsConfig) -> Self {
        Self {
            samples: RollingWindow::new(config.capacity()),
            category_stats: BTreeMap::new(),
            difficulty_progression: BTreeMap::new(),
            recent_outcomes: RollingWindow::new(RECENT_OUTCOMES),
            skills: SkillProfile::default(),
            attempt_count: 0,
            insight_cooldowns: Cooldowns::new(),
            pattern_cooldowns: Cooldowns::new(),
        }
    }

    /// Records every normalized reading and attempt produced by the telemetry sink.
    pub fn handle(&mut self, readings: &[TelemetryReading], attempts: &[PuzzleAttempt]) {
        for attempt in attempts {
            self.record_attempt(attempt);
        }
        for reading in readings {
            self.record(reading);
        }
    }

    /// Derives scores for `reading` and appends the resulting sample to the window.
    pub fn record(&mut self, reading: &TelemetryReading) {
        let recent = || {
            self.samples
                .recent(metrics::RECENT_SIGNALS - 1)
                .map(Signals::from)
                .chain(std::iter::once(Signals::from(reading)))
        };
        let engagement = metrics::engagement(recent());
        let frustration = metrics::frustration(recent());
        let mastery = self.compute_mastery();

        let sample = PerformanceSample::new(reading, engagement, frustration, mastery);
        let _ = self.samples.push(sample);
    }

    /// Folds a puzzle attempt into category statistics and the skill profile.
    pub fn record_attempt(&mut self, attempt: &PuzzleAttempt) {
        let stats = self.category_stats.entry(attempt.category).or_default();
        stats.record(attempt);
        self.skills.update(stats, attempt);

        let _ = self
            .difficulty_progression
            .entry(attempt.category)
            .or_insert_with(|| RollingWindow::new(DIFFICULTY_PROGRESSION_CAPACITY))
            .push(attempt.difficulty);
        let _ = self.recent_outcomes.push(attempt.success);
        self.attempt_count = self.attempt_count.saturating_add(1);

        debug!(
            category = attempt.category.label(),
            success = attempt.success,
            skill = self.skills.skill(attempt.category),
            "puzzle attempt recorded"
        );
    }

    /// Engagement over the newest samples, 0.5 with fewer than five samples.
    #[must_use]
    pub fn compute_engagement(&self) -> f32 {
        metrics::engagement(self.recent_signals())
    }

    /// Frustration over the newest ten samples, 0.0 with fewer than ten samples.
    #[must_use]
    pub fn compute_frustration(&self) -> f32 {
        metrics::frustration(self.recent_signals())
    }

    /// Mean mastery score over categories with at least three attempts.
    ///
    /// Categories with fewer attempts are excluded; with no qualifying
    /// category the neutral value 0.5 is returned.
    #[must_use]
    pub fn compute_mastery(&self) -> f32 {
        let scores = self
            .category_stats
            .values()
            .filter(|stats| stats.is_scorable())
            .map(CategoryStats::mastery_score);
        let (sum, count) = scores.fold((0.0f32, 0u32), |(sum, count), score| {
            (sum + score, count + 1)
        });
        if count == 0 {
            return NEUTRAL_MASTERY;
        }
        unit(sum / count as f32)
    }

    /// Success rate over the most recent attempts.
    #[must_use]
    pub fn success_rate(&self) -> f32 {
        if self.recent_outcomes.is_empty() {
            return NEUTRAL_SUCCESS_RATE;
        }
        let successes = self.recent_outcomes.iter().filter(|success| **success).count();
        successes as f32 / self.recent_outcomes.len() as f32
    }

    /// Compares the newest twenty samples with the preceding twenty.
    ///
    /// Returns `None` with fewer than forty samples.
    #[must_use]
    pub fn trend(&self) -> Option<Trend> {
        detection::trend(&self.samples)
    }

    /// Emits trend insights, each kind at most once per cooldown window.
    pub fn detect_trend(&mut self, now: SessionTime, out: &mut Vec<Event>) {
        let Some(trend) = self.trend() else {
            return;
        };

        for insight in detection::insights(trend, now) {
            if !self.insight_cooldowns.try_fire(insight.kind, now) {
                continue;
            }
            info!(kind = ?insight.kind, confidence = insight.confidence, "{}", insight.message);
            out.push(Event::InsightDetected(insight));
        }
    }

    /// Emits behavior patterns, each kind at most once per cooldown window.
    ///
    /// Requires at least fifty samples; otherwise this is a no-op.
    pub fn detect_behavior_patterns(&mut self, now: SessionTime, out: &mut Vec<Event>) {
        for pattern in detection::behavior_patterns(&self.samples, now) {
            if !self.pattern_cooldowns.try_fire(pattern.kind, now) {
                continue;
            }
            info!(kind = ?pattern.kind, confidence = pattern.confidence, "{}", pattern.description);
            out.push(Event::BehaviorPatternDetected(pattern));
        }
    }

    /// Runs trend and behavior detection in one periodic pass.
    pub fn analyze(&mut self, now: SessionTime, out: &mut Vec<Event>) {
        self.detect_trend(now, out);
        self.detect_behavior_patterns(now, out);
    }

    /// Summary consumed by the difficulty and generation loops.
    #[must_use]
    pub fn snapshot(&self) -> PerformanceSnapshot {
        let engagement = self.compute_engagement();
        let frustration = self.compute_frustration();
        let mastery = self.compute_mastery();
        PerformanceSnapshot {
            engagement,
            frustration,
            mastery,
            average_performance: unit((engagement + mastery + (1.0 - frustration)) / 3.0),
            success_rate: self.success_rate(),
            sample_count: self.samples.len(),
            attempt_count: self.attempt_count,
        }
    }

    /// Samples currently held, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &PerformanceSample> {
        self.samples.iter()
    }

    /// Number of samples currently held.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Capacity of the sample window.
    #[must_use]
    pub fn window_capacity(&self) -> usize {
        self.samples.capacity()
    }

    /// Statistics for a category, if any attempt was recorded.
    #[must_use]
    pub fn category_stats(&self, category: PuzzleCategory) -> Option<&CategoryStats> {
        self.category_stats.get(&category)
    }

    /// Recent difficulties attempted for a category, oldest first.
    #[must_use]
    pub fn difficulty_progression(&self, category: PuzzleCategory) -> Vec<f32> {
        self.difficulty_progression
            .get(&category)
            .map(|window| window.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Per-category skill estimates.
    #[must_use]
    pub fn skills(&self) -> &SkillProfile {
        &self.skills
    }

    fn recent_signals(&self) -> impl Iterator<Item = Signals> + '_ {
        self.samples.recent(metrics::RECENT_SIGNALS).map(Signals::from)
    }
}

impl Default for PerformanceAnalyzer {
    fn default() -> Self {
        Self::new(&AnalyticsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::{AnalysisTier, AnalyticsConfig, PerformanceAnalyzer};

    #[test]
    fn tier_selects_window_capacity() {
        let analyzer = PerformanceAnalyzer::new(&AnalyticsConfig {
            tier: AnalysisTier::Light,
            window_capacity: None,
        });
        assert_eq!(analyzer.window_capacity(), 20);

        let explicit = AnalyticsConfig {
            tier: AnalysisTier::Deep,
            window_capacity: Some(64),
        };
        assert_eq!(explicit.capacity(), 64);
        assert!(AnalyticsConfig {
            tier: AnalysisTier::Standard,
            window_capacity: Some(0),
        }
        .validate()
        .is_err());
    }

    #[test]
    fn empty_analyzer_reports_neutral_defaults() {
        let analyzer = PerformanceAnalyzer::default();
        let snapshot = analyzer.snapshot();
        assert_eq!(snapshot.engagement, 0.5);
        assert_eq!(snapshot.frustration, 0.0);
        assert_eq!(snapshot.mastery, 0.5);
        assert_eq!(snapshot.success_rate, 0.5);
        assert!(analyzer.trend().is_none());
    }
}
