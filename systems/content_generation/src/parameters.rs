//! Category parameter tables.
//!
//! Every formula takes the integer puzzle difficulty `d` in `[1, 10]`.
//! Tolerances and time limits shrink while required counts grow as `d`
//! increases.
//!
//! | Category | Parameters |
//! |---|---|
//! | RelicPlacement | `requiredRelics = 2 + d/2`, `snapDistance = max(0.3 − 0.02d, 0.08)`, `timeLimit = max(180 − 10d, 60)` |
//! | Gesture | `gestureHoldTime = 0.5 + 0.15d`, `gestureTolerance = max(0.35 − 0.025d, 0.08)`, `requiredGestures = 2 + d/2` |
//! | PatternMatching | `patternLength = 3 + d/2`, `symbolCount = 4 + d/3`, `timeLimit = max(150 − 8d, 45)` |
//! | Sequence | `sequenceLength = 3 + d`, `displayTime = max(2.0 − 0.12d, 0.6)`, `allowedMistakes = max(3 − d/3, 0)` |
//! | Logic | `switchCount = 3 + d/2`, `constraintCount = 1 + d/2`, `hintDelay = 30 + 6d` |
//! | Physics | `objectCount = 2 + d/3`, `precision = max(0.3 − 0.02d, 0.06)`, `timeLimit = max(200 − 10d, 70)` |
//! | Combination | `dialCount = 2 + d/3`, `symbolsPerDial = 4 + d/2`, `attemptLimit = max(10 − d/2, 3)` |
//!
//! Divisions are integer divisions.

use puzzle_director_core::{PuzzleCategory, PuzzleDifficulty, PuzzleParameters, PuzzleRequirements};

/// Name of the time limit parameter shared by timed categories.
pub const TIME_LIMIT: &str = "timeLimit";

const BASE_SUCCESS_THRESHOLD: f32 = 0.55;
const SUCCESS_THRESHOLD_PER_LEVEL: f32 = 0.04;
const MAX_SUCCESS_THRESHOLD: f32 = 0.95;

/// Builds the parameter table of a puzzle.
#[must_use]
pub fn parameters(category: PuzzleCategory, difficulty: PuzzleDifficulty) -> PuzzleParameters {
    let d = i32::from(difficulty.get());
    let f = difficulty.as_f32();
    let mut table = PuzzleParameters::new();
    match category {
        PuzzleCategory::RelicPlacement => {
            table.set("requiredRelics", count(2 + d / 2));
            table.set("snapDistance", (0.3 - 0.02 * f).max(0.08));
            table.set(TIME_LIMIT, (180.0 - 10.0 * f).max(60.0));
        }
        PuzzleCategory::Gesture => {
            table.set("gestureHoldTime", 0.5 + 0.15 * f);
            table.set("gestureTolerance", (0.35 - 0.025 * f).max(0.08));
            table.set("requiredGestures", count(2 + d / 2));
        }
        PuzzleCategory::PatternMatching => {
            table.set("patternLength", count(3 + d / 2));
            table.set("symbolCount", count(4 + d / 3));
            table.set(TIME_LIMIT, (150.0 - 8.0 * f).max(45.0));
        }
        PuzzleCategory::Sequence => {
            table.set("sequenceLength", count(3 + d));
            table.set("displayTime", (2.0 - 0.12 * f).max(0.6));
            table.set("allowedMistakes", count((3 - d / 3).max(0)));
        }
        PuzzleCategory::Logic => {
            table.set("switchCount", count(3 + d / 2));
            table.set("constraintCount", count(1 + d / 2));
            table.set("hintDelay", 30.0 + 6.0 * f);
        }
        PuzzleCategory::Physics => {
            table.set("objectCount", count(2 + d / 3));
            table.set("precision", (0.3 - 0.02 * f).max(0.06));
            table.set(TIME_LIMIT, (200.0 - 10.0 * f).max(70.0));
        }
        PuzzleCategory::Combination => {
            table.set("dialCount", count(2 + d / 3));
            table.set("symbolsPerDial", count(4 + d / 2));
            table.set("attemptLimit", count((10 - d / 2).max(3)));
        }
    }
    table
}

/// Derives pass/fail requirements from a parameter table built by [`parameters`].
#[must_use]
pub fn requirements(
    category: PuzzleCategory,
    difficulty: PuzzleDifficulty,
    table: &PuzzleParameters,
) -> PuzzleRequirements {
    let param = |name: &str| table.get(name).unwrap_or(0.0);
    let actions = match category {
        PuzzleCategory::RelicPlacement => param("requiredRelics"),
        PuzzleCategory::Gesture => param("requiredGestures"),
        PuzzleCategory::PatternMatching => param("patternLength"),
        PuzzleCategory::Sequence => param("sequenceLength"),
        PuzzleCategory::Logic => param("switchCount"),
        PuzzleCategory::Physics => param("objectCount"),
        PuzzleCategory::Combination => param("dialCount"),
    }
    .max(1.0);

    let max_time_secs = match table.get(TIME_LIMIT) {
        Some(limit) => limit,
        None => match category {
            PuzzleCategory::Gesture => 20.0 + 10.0 * actions,
            PuzzleCategory::Sequence => 20.0 + actions * param("displayTime") * 4.0,
            PuzzleCategory::Logic => param("hintDelay") * 4.0,
            _ => 30.0 + actions * param("symbolsPerDial") * 3.0,
        },
    };
    let min_time_secs = (5.0 + 2.0 * actions).min(max_time_secs * 0.5);

    PuzzleRequirements {
        min_time_secs,
        max_time_secs,
        required_action_count: actions as u32,
        success_threshold: success_threshold(difficulty),
    }
}

/// Fraction of correct actions needed to pass at `difficulty`.
#[must_use]
pub fn success_threshold(difficulty: PuzzleDifficulty) -> f32 {
    (BASE_SUCCESS_THRESHOLD + SUCCESS_THRESHOLD_PER_LEVEL * difficulty.as_f32())
        .min(MAX_SUCCESS_THRESHOLD)
}

fn count(value: i32) -> f32 {
    value as f32
}
