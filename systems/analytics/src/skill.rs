use std::collections::BTreeMap;

use puzzle_director_core::{unit, PuzzleAttempt, PuzzleCategory, MAX_DIFFICULTY};
use serde::{Deserialize, Serialize};

/// Attempts required before a category contributes to mastery or skill.
pub const MIN_ATTEMPTS_FOR_SKILL: u32 = 3;
/// Skill reported for categories without enough attempts.
pub const NEUTRAL_SKILL: f32 = 0.5;
/// Completion time at which time efficiency reaches zero, in seconds.
pub const TIME_EFFICIENCY_HORIZON_SECS: f32 = 600.0;

const SKILL_SMOOTHING: f32 = 0.1;

/// Aggregated attempt statistics for one puzzle category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    attempts: u32,
    successes: u32,
    total_time_secs: f32,
    solved_difficulty_sum: f32,
}

impl CategoryStats {
    pub(crate) fn record(&mut self, attempt: &PuzzleAttempt) {
        self.attempts = self.attempts.saturating_add(1);
        self.total_time_secs += attempt.completion_time_secs;
        if attempt.success {
            self.successes = self.successes.saturating_add(1);
            self.solved_difficulty_sum += attempt.difficulty;
        }
    }

    /// Attempts recorded for the category.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Successful attempts recorded for the category.
    #[must_use]
    pub const fn successes(&self) -> u32 {
        self.successes
    }

    /// Reports whether enough attempts exist to score the category.
    #[must_use]
    pub const fn is_scorable(&self) -> bool {
        self.attempts >= MIN_ATTEMPTS_FOR_SKILL
    }

    /// Fraction of attempts that succeeded.
    #[must_use]
    pub fn completion_rate(&self) -> f32 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.successes as f32 / self.attempts as f32
    }

    /// `clamp(1 − avgTime/600, 0, 1)`.
    #[must_use]
    pub fn time_efficiency(&self) -> f32 {
        if self.attempts == 0 {
            return 0.0;
        }
        let average = self.total_time_secs / self.attempts as f32;
        unit(1.0 - average / TIME_EFFICIENCY_HORIZON_SECS)
    }

    /// Mean difficulty of solved attempts relative to the maximum difficulty.
    #[must_use]
    pub fn difficulty_handling(&self) -> f32 {
        if self.successes == 0 {
            return 0.0;
        }
        unit(self.solved_difficulty_sum / self.successes as f32 / f32::from(MAX_DIFFICULTY))
    }

    /// `completionRate×0.5 + timeEfficiency×0.3 + difficultyHandling×0.2`.
    #[must_use]
    pub fn mastery_score(&self) -> f32 {
        unit(
            self.completion_rate() * 0.5
                + self.time_efficiency() * 0.3
                + self.difficulty_handling() * 0.2,
        )
    }
}

/// Per-category skill estimates updated incrementally from attempts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillProfile {
    skills: BTreeMap<PuzzleCategory, f32>,
}

impl SkillProfile {
    /// Skill for `category`, or [`NEUTRAL_SKILL`] when data is insufficient.
    #[must_use]
    pub fn skill(&self, category: PuzzleCategory) -> f32 {
        self.skills.get(&category).copied().unwrap_or(NEUTRAL_SKILL)
    }

    /// Reports whether the profile holds an entry for `category`.
    #[must_use]
    pub fn has_entry(&self, category: PuzzleCategory) -> bool {
        self.skills.contains_key(&category)
    }

    /// Iterates recorded skills in category order.
    pub fn iter(&self) -> impl Iterator<Item = (PuzzleCategory, f32)> + '_ {
        self.skills.iter().map(|(category, skill)| (*category, *skill))
    }

    /// Folds an attempt into the profile. `stats` must already include it.
    pub(crate) fn update(&mut self, stats: &CategoryStats, attempt: &PuzzleAttempt) {
        if !stats.is_scorable() {
            return;
        }

        let observed = if attempt.success {
            0.5 + 0.5 * unit(attempt.difficulty / f32::from(MAX_DIFFICULTY))
        } else {
            0.0
        };

        let skill = self
            .skills
            .entry(attempt.category)
            .or_insert_with(|| stats.mastery_score());
        if stats.attempts() > MIN_ATTEMPTS_FOR_SKILL {
            *skill = unit(*skill + (observed - *skill) * SKILL_SMOOTHING);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CategoryStats, SkillProfile, NEUTRAL_SKILL};
    use puzzle_director_core::{PlayerId, PuzzleAttempt, PuzzleCategory, SessionTime};

    fn attempt(success: bool, time: f32, difficulty: f32) -> PuzzleAttempt {
        PuzzleAttempt {
            timestamp: SessionTime::ZERO,
            category: PuzzleCategory::Gesture,
            player: PlayerId::new(1),
            success,
            completion_time_secs: time,
            difficulty,
        }
    }

    #[test]
    fn mastery_score_combines_rate_time_and_difficulty() {
        let mut stats = CategoryStats::default();
        for outcome in [true, true, false, true] {
            stats.record(&attempt(outcome, 300.0, 6.0));
        }
        // 0.75 × 0.5 + 0.5 × 0.3 + 0.6 × 0.2
        assert!((stats.mastery_score() - 0.645).abs() < 1e-5);
    }

    #[test]
    fn skill_entry_appears_after_three_attempts() {
        let mut stats = CategoryStats::default();
        let mut profile = SkillProfile::default();
        for index in 0..3 {
            let next = attempt(true, 60.0, 5.0);
            stats.record(&next);
            profile.update(&stats, &next);
            let expected = index == 2;
            assert_eq!(profile.has_entry(PuzzleCategory::Gesture), expected);
        }
        assert_eq!(profile.skill(PuzzleCategory::Logic), NEUTRAL_SKILL);

        let seeded = profile.skill(PuzzleCategory::Gesture);
        let failure = attempt(false, 60.0, 5.0);
        stats.record(&failure);
        profile.update(&stats, &failure);
        assert!(profile.skill(PuzzleCategory::Gesture) < seeded);
    }
}
