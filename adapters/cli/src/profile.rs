use std::time::Duration;

use clap::ValueEnum;
use puzzle_director_core::{PlayerId, PuzzleCategory, RawPuzzleOutcome, RawTelemetry, SessionTime};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

const OUTCOME_INTERVAL: Duration = Duration::from_secs(15);
const OSCILLATION_PERIOD_SECS: u64 = 60;
const NOISE: f32 = 0.1;

/// Behaviour of the simulated player driving a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Profile {
    /// Low activity, frequent failures and stalled progress.
    Struggling,
    /// Moderate activity and a mixed success record.
    Steady,
    /// High activity and fast solves.
    Expert,
    /// Alternates between expert and struggling play every minute.
    Oscillating,
}

impl Profile {
    fn skill(self, now: SessionTime) -> f32 {
        match self {
            Self::Struggling => 0.15,
            Self::Steady => 0.55,
            Self::Expert => 0.92,
            Self::Oscillating => {
                if (now.elapsed().as_secs() / OSCILLATION_PERIOD_SECS) % 2 == 0 {
                    0.9
                } else {
                    0.1
                }
            }
        }
    }
}

/// Deterministic synthetic player producing telemetry and puzzle outcomes.
#[derive(Debug)]
pub(crate) struct SyntheticPlayer {
    profile: Profile,
    rng: ChaCha8Rng,
    player: PlayerId,
    since_outcome: Duration,
}

impl SyntheticPlayer {
    pub(crate) fn new(profile: Profile, seed: u64) -> Self {
        Self {
            profile,
            rng: ChaCha8Rng::seed_from_u64(seed),
            player: PlayerId::new(1),
            since_outcome: Duration::ZERO,
        }
    }

    /// Telemetry for the current tick.
    pub(crate) fn telemetry(&mut self, now: SessionTime) -> RawTelemetry {
        let skill = self.profile.skill(now);
        RawTelemetry {
            movement_intensity: self.jitter(skill),
            interaction_frequency: self.jitter(skill),
            puzzle_progress: self.jitter(skill * 0.9),
            active_puzzle_count: self.rng.gen_range(1..=3),
        }
    }

    /// Outcome of a puzzle finished during this tick, if any.
    pub(crate) fn outcome(
        &mut self,
        now: SessionTime,
        dt: Duration,
        difficulty: f32,
    ) -> Option<RawPuzzleOutcome> {
        self.since_outcome += dt;
        if self.since_outcome < OUTCOME_INTERVAL {
            return None;
        }
        self.since_outcome = Duration::ZERO;

        let skill = self.profile.skill(now);
        let chance = (skill - (difficulty - 5.0) * 0.05).clamp(0.02, 0.98);
        let index = self.rng.gen_range(0..PuzzleCategory::ALL.len());
        let success = self.rng.gen::<f32>() < chance;
        let completion_time_secs = 600.0 * (1.0 - skill) + self.rng.gen_range(0.0..30.0);
        Some(RawPuzzleOutcome {
            category: PuzzleCategory::ALL[index],
            player: self.player,
            success,
            completion_time_secs,
            difficulty_at_attempt: difficulty,
        })
    }

    fn jitter(&mut self, value: f32) -> f32 {
        (value + self.rng.gen_range(-NOISE..=NOISE)).clamp(0.0, 1.0)
    }
}
