use std::collections::BTreeMap;

use puzzle_director_core::{
    unit, BehaviorPattern, BehaviorPatternKind, Insight, InsightKind, PerformanceSample,
    RollingWindow, SessionTime, DETECTION_COOLDOWN,
};

use crate::metrics::{mean, spread};

/// Samples required before trends are compared.
pub const TREND_MIN_SAMPLES: usize = 40;
/// Samples in each half of the trend comparison.
pub const TREND_HALF_WINDOW: usize = 20;
/// Samples required before behavior patterns are analysed.
pub const PATTERN_MIN_SAMPLES: usize = 50;

const ENGAGEMENT_DECLINE: f32 = -0.2;
const FRUSTRATION_INCREASE: f32 = 0.3;
const FLOW_MARGIN: f32 = 0.1;

const LOW_VARIANCE: f32 = 0.02;
const HIGH_VARIANCE: f32 = 0.08;
const HIGH_ACTIVITY: f32 = 0.7;
const LOW_INTERACTION: f32 = 0.2;
const LOW_FINAL_PROGRESS: f32 = 0.2;
const HESITANT_MOVEMENT: f32 = 0.4;
const RAPID_PROGRESS_GAIN: f32 = 0.5;
const PROGRESS_EDGE: usize = 10;

/// Suppresses repeated notifications of the same kind within the cooldown.
#[derive(Clone, Debug)]
pub(crate) struct Cooldowns<K> {
    last_fired: BTreeMap<K, SessionTime>,
}

impl<K: Ord + Copy> Cooldowns<K> {
    pub(crate) fn new() -> Self {
        Self {
            last_fired: BTreeMap::new(),
        }
    }

    /// Returns `true` and arms the cooldown when `kind` may fire at `now`.
    pub(crate) fn try_fire(&mut self, kind: K, now: SessionTime) -> bool {
        if let Some(last) = self.last_fired.get(&kind) {
            if now.saturating_since(*last) < DETECTION_COOLDOWN {
                return false;
            }
        }
        let _ = self.last_fired.insert(kind, now);
        true
    }
}

/// Engagement and frustration deltas between the two newest half windows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trend {
    /// Mean engagement of the newest half minus the preceding half.
    pub engagement: f32,
    /// Mean frustration of the newest half minus the preceding half.
    pub frustration: f32,
}

pub(crate) fn trend(samples: &RollingWindow<PerformanceSample>) -> Option<Trend> {
    if samples.len() < TREND_MIN_SAMPLES {
        return None;
    }

    let window: Vec<&PerformanceSample> = samples.recent(TREND_HALF_WINDOW * 2).collect();
    let (previous, recent) = window.split_at(TREND_HALF_WINDOW);

    let engagement = mean(recent.iter().map(|s| s.engagement()))
        - mean(previous.iter().map(|s| s.engagement()));
    let frustration = mean(recent.iter().map(|s| s.frustration()))
        - mean(previous.iter().map(|s| s.frustration()));

    Some(Trend {
        engagement,
        frustration,
    })
}

pub(crate) fn insights(trend: Trend, now: SessionTime) -> Vec<Insight> {
    let mut found = Vec::new();

    if trend.engagement < ENGAGEMENT_DECLINE {
        found.push(Insight {
            kind: InsightKind::EngagementDecline,
            confidence: unit(-trend.engagement * 2.0),
            message: format!(
                "engagement fell by {:.2} across the last {} samples",
                -trend.engagement,
                TREND_HALF_WINDOW * 2
            ),
            detected_at: now,
        });
    }

    if trend.frustration > FRUSTRATION_INCREASE {
        found.push(Insight {
            kind: InsightKind::FrustrationIncrease,
            confidence: unit(trend.frustration * 2.0),
            message: format!(
                "frustration rose by {:.2} across the last {} samples",
                trend.frustration,
                TREND_HALF_WINDOW * 2
            ),
            detected_at: now,
        });
    }

    if trend.engagement > FLOW_MARGIN && trend.frustration < -FLOW_MARGIN {
        found.push(Insight {
            kind: InsightKind::OptimalFlow,
            confidence: unit(trend.engagement - trend.frustration),
            message: "player is in flow: engagement rising while frustration falls".to_owned(),
            detected_at: now,
        });
    }

    found
}

pub(crate) fn behavior_patterns(
    samples: &RollingWindow<PerformanceSample>,
    now: SessionTime,
) -> Vec<BehaviorPattern> {
    let mut found = Vec::new();
    if samples.len() < PATTERN_MIN_SAMPLES {
        return found;
    }

    let movement = spread(samples.iter().map(|s| s.movement_intensity()));
    let interaction = spread(samples.iter().map(|s| s.interaction_frequency()));
    let progress = spread(samples.iter().map(|s| s.puzzle_progress()));
    let final_progress = samples.latest().map_or(0.0, |s| s.puzzle_progress());

    let mut push = |kind, confidence: f32, description: String| {
        found.push(BehaviorPattern {
            kind,
            confidence: unit(confidence),
            description,
            detected_at: now,
        });
    };

    if movement.variance < LOW_VARIANCE && movement.mean >= HIGH_ACTIVITY {
        push(
            BehaviorPatternKind::ConsistentHighActivity,
            1.0 - movement.variance / LOW_VARIANCE,
            format!("steady high movement (mean {:.2})", movement.mean),
        );
    }

    if interaction.variance < LOW_VARIANCE && interaction.mean <= LOW_INTERACTION {
        push(
            BehaviorPatternKind::LowInteraction,
            1.0 - interaction.variance / LOW_VARIANCE,
            format!("interaction stays low (mean {:.2})", interaction.mean),
        );
    }

    if progress.variance < LOW_VARIANCE && final_progress < LOW_FINAL_PROGRESS {
        push(
            BehaviorPatternKind::StuckOnPuzzle,
            1.0 - progress.variance / LOW_VARIANCE,
            format!("progress flat at {final_progress:.2}"),
        );
    }

    let earliest = mean(samples.iter().take(PROGRESS_EDGE).map(|s| s.puzzle_progress()));
    let latest = mean(samples.recent(PROGRESS_EDGE).map(|s| s.puzzle_progress()));
    if latest - earliest >= RAPID_PROGRESS_GAIN {
        push(
            BehaviorPatternKind::RapidProgress,
            latest - earliest,
            format!("progress climbed from {earliest:.2} to {latest:.2}"),
        );
    }

    if movement.variance >= HIGH_VARIANCE && movement.mean <= HESITANT_MOVEMENT {
        push(
            BehaviorPatternKind::HesitantMovement,
            movement.variance / (HIGH_VARIANCE * 2.0),
            format!("erratic, low movement (variance {:.3})", movement.variance),
        );
    }

    found
}

#[cfg(test)]
mod tests {
    use super::Cooldowns;
    use puzzle_director_core::{InsightKind, SessionTime};

    #[test]
    fn cooldown_suppresses_repeats_for_three_hundred_seconds() {
        let mut cooldowns = Cooldowns::new();
        assert!(cooldowns.try_fire(InsightKind::OptimalFlow, SessionTime::from_secs(10)));
        assert!(!cooldowns.try_fire(InsightKind::OptimalFlow, SessionTime::from_secs(309)));
        assert!(cooldowns.try_fire(InsightKind::EngagementDecline, SessionTime::from_secs(309)));
        assert!(cooldowns.try_fire(InsightKind::OptimalFlow, SessionTime::from_secs(310)));
    }
}
