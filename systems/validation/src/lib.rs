#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Quality pipeline run once over every freshly generated room.
//!
//! Stages run in a fixed order: overlap resolution, cost check, comfort
//! flagging and scoring. The validator repairs what it can and never rejects
//! a room.

use puzzle_director_core::{
    Complexity, ConfigError, Dimensions, GeneratedRoom, RoomFlags, RoomLayout,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Highest quality score.
pub const MAX_QUALITY_SCORE: f32 = 100.0;

/// Validator thresholds and budgets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Smallest allowed distance between two puzzles, in metres.
    pub min_separation: f32,
    /// Largest offset applied on x and z when nudging an overlapping puzzle.
    pub perturbation: f32,
    /// Overlap resolution passes before residual overlaps are accepted.
    pub max_overlap_retries: u32,
    /// Estimated rendering cost per complexity step.
    pub cost_per_complexity: u64,
    /// Estimated rendering cost per puzzle.
    pub cost_per_puzzle: u64,
    /// Cost above which room complexity is reduced.
    pub cost_budget: u64,
    /// Complexity from which level-of-detail tiers are attached.
    pub lod_complexity_threshold: u8,
    /// Number of level-of-detail tiers attached.
    pub lod_levels: u8,
    /// Room height above which comfort features are flagged.
    pub comfort_height_threshold: f32,
    /// Complexity from which accessibility cues are flagged.
    pub accessibility_complexity_threshold: u8,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_separation: 1.5,
            perturbation: 1.0,
            max_overlap_retries: 10,
            cost_per_complexity: 15_000,
            cost_per_puzzle: 4_000,
            cost_budget: 120_000,
            lod_complexity_threshold: 5,
            lod_levels: 3,
            comfort_height_threshold: 6.0,
            accessibility_complexity_threshold: 7,
        }
    }
}

impl ValidationConfig {
    /// Rejects distances and budgets the pipeline cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("validation.min_separation", self.min_separation),
            ("validation.perturbation", self.perturbation),
            ("validation.comfort_height_threshold", self.comfort_height_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    field,
                    value: f64::from(value),
                });
            }
        }
        if self.cost_budget == 0 {
            return Err(ConfigError::Zero {
                field: "validation.cost_budget",
            });
        }
        Ok(())
    }
}

/// Outcome of validating one room.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Overlapping pairs found before resolution.
    pub initial_overlaps: usize,
    /// Overlapping pairs left after the last pass.
    pub residual_overlaps: usize,
    /// Resolution passes executed.
    pub overlap_passes: u32,
    /// Estimated rendering cost before any reduction.
    pub estimated_cost: u64,
    /// Whether complexity was lowered to meet the budget.
    pub complexity_reduced: bool,
    /// Level-of-detail tiers attached.
    pub lod_levels: u8,
    /// Comfort and accessibility flags attached.
    pub flags: RoomFlags,
    /// Final score within `[0, 100]`.
    pub quality_score: f32,
}

/// Deterministic room repair and scoring pipeline.
#[derive(Clone, Debug)]
pub struct QualityValidator {
    config: ValidationConfig,
    min_complexity: Complexity,
}

impl QualityValidator {
    /// Creates a validator that never lowers complexity below `min_complexity`.
    #[must_use]
    pub fn new(config: &ValidationConfig, min_complexity: Complexity) -> Self {
        Self {
            config: config.clone(),
            min_complexity,
        }
    }

    /// Runs every stage over `room`, drawing overlap offsets from `rng`.
    pub fn validate<R>(&self, room: &mut GeneratedRoom, rng: &mut R) -> ValidationReport
    where
        R: Rng + ?Sized,
    {
        let initial_overlaps = self.count_overlaps(room);
        let overlap_passes = self.resolve_overlaps(room, rng);

        let estimated_cost = self.estimate_cost(room);
        let complexity_reduced = self.enforce_budget(room, estimated_cost);
        let residual_overlaps = self.count_overlaps(room);
        if residual_overlaps > 0 {
            debug!(
                room = room.id.get(),
                residual_overlaps, "overlaps remain after final resolution pass"
            );
        }
        self.attach_lod(room);
        self.flag_comfort(room);
        room.quality_score = quality_score(room);

        info!(
            room = room.id.get(),
            complexity = room.complexity.get(),
            score = room.quality_score,
            "room validated"
        );

        ValidationReport {
            initial_overlaps,
            residual_overlaps,
            overlap_passes,
            estimated_cost,
            complexity_reduced,
            lod_levels: room.lod_levels,
            flags: room.flags,
            quality_score: room.quality_score,
        }
    }

    /// Number of puzzle pairs closer than the minimum separation.
    #[must_use]
    pub fn count_overlaps(&self, room: &GeneratedRoom) -> usize {
        let puzzles = &room.puzzles;
        let mut overlaps = 0;
        for (index, first) in puzzles.iter().enumerate() {
            for second in &puzzles[index + 1..] {
                if first.position.distance(second.position) < self.config.min_separation {
                    overlaps += 1;
                }
            }
        }
        overlaps
    }

    /// Estimated rendering cost of the room, saturating at `u64::MAX`.
    #[must_use]
    pub fn estimate_cost(&self, room: &GeneratedRoom) -> u64 {
        let structure =
            u64::from(room.complexity.get()).saturating_mul(self.config.cost_per_complexity);
        let puzzles = u64::try_from(room.puzzles.len())
            .unwrap_or(u64::MAX)
            .saturating_mul(self.config.cost_per_puzzle);
        structure.saturating_add(puzzles)
    }

    fn resolve_overlaps<R>(&self, room: &mut GeneratedRoom, rng: &mut R) -> u32
    where
        R: Rng + ?Sized,
    {
        let spread = self.config.perturbation.abs();
        let mut passes = 0;
        while passes < self.config.max_overlap_retries {
            let mut moved = false;
            for later in 1..room.puzzles.len() {
                let crowded = room.puzzles[..later].iter().any(|earlier| {
                    earlier.position.distance(room.puzzles[later].position)
                        < self.config.min_separation
                });
                if crowded {
                    let position = &mut room.puzzles[later].position;
                    position.x += rng.gen_range(-spread..=spread);
                    position.z += rng.gen_range(-spread..=spread);
                    moved = true;
                }
            }
            if !moved {
                break;
            }
            passes += 1;
        }
        passes
    }

    fn enforce_budget(&self, room: &mut GeneratedRoom, cost: u64) -> bool {
        if cost <= self.config.cost_budget || room.complexity <= self.min_complexity {
            return false;
        }
        let reduced = Complexity::new(room.complexity.get() - 1);
        debug!(
            room = room.id.get(),
            cost,
            budget = self.config.cost_budget,
            complexity = reduced.get(),
            "room over cost budget, complexity reduced"
        );
        reshape(room, reduced);
        true
    }

    fn attach_lod(&self, room: &mut GeneratedRoom) {
        room.lod_levels = if room.complexity.get() >= self.config.lod_complexity_threshold {
            self.config.lod_levels
        } else {
            0
        };
    }

    fn flag_comfort(&self, room: &mut GeneratedRoom) {
        room.flags = RoomFlags {
            comfort_features: room.dimensions.height > self.config.comfort_height_threshold,
            accessibility_cues: room.complexity.get()
                >= self.config.accessibility_complexity_threshold,
        };
    }
}

/// Rebuilds extents and layout for `complexity` and scales puzzle floor
/// positions with the room so they keep their place on the ring.
fn reshape(room: &mut GeneratedRoom, complexity: Complexity) {
    let resized = Dimensions::for_complexity(complexity);
    let previous_span = room.dimensions.floor_span();
    if previous_span.is_finite() && previous_span > 0.0 {
        let scale = resized.floor_span() / previous_span;
        for puzzle in &mut room.puzzles {
            puzzle.position.x *= scale;
            puzzle.position.z *= scale;
        }
    }
    room.complexity = complexity;
    room.dimensions = resized;
    room.layout = RoomLayout::for_complexity(complexity);
}

/// Scores a room: five points per complexity step, two per puzzle, plus
/// bonuses for a theme (10), level-of-detail tiers (15) and comfort flags (10).
#[must_use]
pub fn quality_score(room: &GeneratedRoom) -> f32 {
    let mut score = f32::from(room.complexity.get()) * 5.0 + room.puzzles.len() as f32 * 2.0;
    if room.theme.is_some() {
        score += 10.0;
    }
    if room.lod_levels > 0 {
        score += 15.0;
    }
    if room.flags.any() {
        score += 10.0;
    }
    score.clamp(0.0, MAX_QUALITY_SCORE)
}
