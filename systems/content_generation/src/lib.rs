#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural room and puzzle generation.
//!
//! Generation runs in two stages so a scheduler can interleave them with
//! other work: [`ContentGenerator::build_structure`] fixes the room shell and
//! [`ContentGenerator::populate_puzzles`] fills it. All randomness comes from
//! the caller's generator, which makes a room a pure function of its inputs.

pub mod parameters;
pub mod seeds;

use puzzle_director_core::{
    unit, Complexity, ConfigError, Dimensions, GeneratedPuzzle, GeneratedRoom, PerformanceSnapshot,
    Position, PuzzleDifficulty, PuzzleId, RoomFlags, RoomId, RoomLayout, SessionTime, Theme,
    MAX_DIFFICULTY, MIN_DIFFICULTY,
};
use puzzle_director_system_puzzle_selection::PuzzleTypeSelector;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const BASE_PUZZLE_CAP: i32 = 5;
const RING_RADIUS_FRACTION: f32 = 0.35;
const INTERACTION_HEIGHT: f32 = 1.0;

/// Relative likelihood of a theme; zero disables it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThemeWeight {
    /// Theme being weighted.
    pub theme: Theme,
    /// Non-negative weight.
    pub weight: f32,
}

/// Generator configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Complexity produced for the weakest performance.
    pub min_room_complexity: u8,
    /// Complexity produced for the strongest performance.
    pub max_room_complexity: u8,
    /// Fewest puzzles placed in a room.
    pub min_puzzles_per_room: u8,
    /// Most puzzles placed in a room.
    pub max_puzzles_per_room: u8,
    /// Extra difficulty multiplier reached by the last puzzle of a room.
    pub difficulty_curve: f32,
    /// Enabled themes and their weights.
    pub themes: Vec<ThemeWeight>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            min_room_complexity: MIN_DIFFICULTY,
            max_room_complexity: MAX_DIFFICULTY,
            min_puzzles_per_room: 1,
            max_puzzles_per_room: 8,
            difficulty_curve: 0.5,
            themes: Theme::ALL
                .iter()
                .map(|theme| ThemeWeight {
                    theme: *theme,
                    weight: 1.0,
                })
                .collect(),
        }
    }
}

impl GenerationConfig {
    /// Rejects bounds and weights the generator cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let global_min = f64::from(MIN_DIFFICULTY);
        let global_max = f64::from(MAX_DIFFICULTY);
        for (field, value) in [
            ("generation.min_room_complexity", self.min_room_complexity),
            ("generation.max_room_complexity", self.max_room_complexity),
        ] {
            if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    field,
                    value: f64::from(value),
                    min: global_min,
                    max: global_max,
                });
            }
        }
        if self.min_room_complexity > self.max_room_complexity {
            return Err(ConfigError::InvertedBounds {
                field: "generation.room_complexity",
                min: f64::from(self.min_room_complexity),
                max: f64::from(self.max_room_complexity),
            });
        }
        if self.min_puzzles_per_room == 0 {
            return Err(ConfigError::Zero {
                field: "generation.min_puzzles_per_room",
            });
        }
        if self.min_puzzles_per_room > self.max_puzzles_per_room {
            return Err(ConfigError::InvertedBounds {
                field: "generation.puzzles_per_room",
                min: f64::from(self.min_puzzles_per_room),
                max: f64::from(self.max_puzzles_per_room),
            });
        }
        if !self.difficulty_curve.is_finite() || self.difficulty_curve < 0.0 {
            return Err(ConfigError::InvalidWeight {
                field: "generation.difficulty_curve",
                value: f64::from(self.difficulty_curve),
            });
        }
        for entry in &self.themes {
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    field: entry.theme.label(),
                    value: f64::from(entry.weight),
                });
            }
        }
        Ok(())
    }
}

/// Room shell produced by the structure stage, awaiting puzzles.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomBlueprint {
    room: GeneratedRoom,
    puzzle_count: usize,
}

impl RoomBlueprint {
    /// Room under construction; its puzzle list is still empty.
    #[must_use]
    pub fn room(&self) -> &GeneratedRoom {
        &self.room
    }

    /// Number of puzzles the populate stage will place.
    #[must_use]
    pub const fn puzzle_count(&self) -> usize {
        self.puzzle_count
    }
}

/// Generates rooms from performance snapshots.
#[derive(Debug)]
pub struct ContentGenerator {
    min_complexity: Complexity,
    max_complexity: Complexity,
    min_puzzles: usize,
    max_puzzles: usize,
    difficulty_curve: f32,
    themes: Vec<ThemeWeight>,
    selector: PuzzleTypeSelector,
    next_room: u64,
    next_puzzle: u64,
}

impl ContentGenerator {
    /// Creates a generator drawing categories from `selector`.
    #[must_use]
    pub fn new(config: &GenerationConfig, selector: PuzzleTypeSelector) -> Self {
        let min_complexity = config.min_room_complexity.min(config.max_room_complexity);
        let max_complexity = config.max_room_complexity.max(config.min_room_complexity);
        let min_puzzles = usize::from(config.min_puzzles_per_room.max(1));
        Self {
            min_complexity: Complexity::new(min_complexity),
            max_complexity: Complexity::new(max_complexity),
            min_puzzles,
            max_puzzles: usize::from(config.max_puzzles_per_room).max(min_puzzles),
            difficulty_curve: config.difficulty_curve.max(0.0),
            themes: config
                .themes
                .iter()
                .copied()
                .filter(|entry| entry.weight > 0.0)
                .collect(),
            selector,
            next_room: 0,
            next_puzzle: 0,
        }
    }

    /// Interpolates room complexity from performance and success rate.
    #[must_use]
    pub fn room_complexity(&self, snapshot: &PerformanceSnapshot) -> Complexity {
        let t = unit(0.5 * snapshot.average_performance + 0.5 * snapshot.success_rate);
        let min = f32::from(self.min_complexity.get());
        let max = f32::from(self.max_complexity.get());
        let value = (min + (max - min) * t).round() as i32;
        Complexity::clamped(value, self.min_complexity, self.max_complexity)
    }

    /// Draws a theme proportionally to its weight.
    ///
    /// Returns `None` when no theme is enabled.
    pub fn select_theme<R>(&self, rng: &mut R) -> Option<Theme>
    where
        R: Rng + ?Sized,
    {
        let total: f32 = self.themes.iter().map(|entry| entry.weight).sum();
        let last = self.themes.last()?;
        let draw = rng.gen::<f32>() * total;
        let mut cumulative = 0.0;
        for entry in &self.themes {
            cumulative += entry.weight;
            if draw < cumulative {
                return Some(entry.theme);
            }
        }
        Some(last.theme)
    }

    /// Puzzle count for a room: `clamp(c / 2, 1, 5)` perturbed by one at most.
    pub fn puzzle_count<R>(&self, complexity: Complexity, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        let base = (i32::from(complexity.get()) / 2).clamp(1, BASE_PUZZLE_CAP);
        let perturbed = base + rng.gen_range(-1..=1);
        let min = self.min_puzzles as i32;
        let max = self.max_puzzles as i32;
        perturbed.clamp(min, max) as usize
    }

    /// Progressive difficulty of puzzle `index` out of `count`.
    ///
    /// The first puzzle uses the room complexity; later ones ramp up linearly
    /// until the last reaches `complexity × (1 + curve)`.
    #[must_use]
    pub fn puzzle_difficulty(&self, complexity: Complexity, index: usize, count: usize) -> PuzzleDifficulty {
        let progression = if count > 1 {
            index.min(count - 1) as f32 / (count - 1) as f32
        } else {
            0.0
        };
        let value = f32::from(complexity.get()) * (1.0 + progression * self.difficulty_curve);
        PuzzleDifficulty::new(value.round() as i32)
    }

    /// Structure stage: allocates the room id and fixes complexity, theme,
    /// size, layout and puzzle count.
    pub fn build_structure<R>(
        &mut self,
        snapshot: &PerformanceSnapshot,
        difficulty: f32,
        now: SessionTime,
        rng: &mut R,
    ) -> RoomBlueprint
    where
        R: Rng + ?Sized,
    {
        let complexity = self.room_complexity(snapshot);
        let theme = self.select_theme(rng);
        if theme.is_none() {
            warn!("no themes enabled, generating unthemed room");
        }
        let puzzle_count = self.puzzle_count(complexity, rng);

        let id = RoomId::new(self.next_room);
        self.next_room = self.next_room.saturating_add(1);

        let name = match theme {
            Some(theme) => format!("{} #{}", theme.label(), id.get()),
            None => format!("Chamber #{}", id.get()),
        };
        debug!(
            room = id.get(),
            complexity = complexity.get(),
            theme = ?theme,
            puzzle_count,
            "room structure built"
        );

        RoomBlueprint {
            room: GeneratedRoom {
                id,
                name,
                complexity,
                theme,
                dimensions: dimensions(complexity),
                layout: layout(complexity),
                puzzles: Vec::with_capacity(puzzle_count),
                flags: RoomFlags::default(),
                lod_levels: 0,
                quality_score: 0.0,
                difficulty_at_generation: difficulty,
                created_at: now,
            },
            puzzle_count,
        }
    }

    /// Populate stage: places the blueprint's puzzles in progression order.
    pub fn populate_puzzles<R>(&mut self, blueprint: RoomBlueprint, rng: &mut R) -> GeneratedRoom
    where
        R: Rng + ?Sized,
    {
        let RoomBlueprint {
            mut room,
            puzzle_count,
        } = blueprint;

        for index in 0..puzzle_count {
            let difficulty = self.puzzle_difficulty(room.complexity, index, puzzle_count);
            let category = self.selector.select(room.complexity, room.theme, rng);
            let parameters = parameters::parameters(category, difficulty);
            let requirements = parameters::requirements(category, difficulty, &parameters);

            let id = PuzzleId::new(self.next_puzzle);
            self.next_puzzle = self.next_puzzle.saturating_add(1);

            room.puzzles.push(GeneratedPuzzle {
                id,
                room: room.id,
                category,
                difficulty,
                position: puzzle_position(room.dimensions, index, puzzle_count),
                parameters,
                requirements,
            });
        }
        room
    }

    /// Runs both stages back to back.
    pub fn generate_room<R>(
        &mut self,
        snapshot: &PerformanceSnapshot,
        difficulty: f32,
        now: SessionTime,
        rng: &mut R,
    ) -> GeneratedRoom
    where
        R: Rng + ?Sized,
    {
        let blueprint = self.build_structure(snapshot, difficulty, now, rng);
        self.populate_puzzles(blueprint, rng)
    }

    /// Category selector used for puzzle draws.
    #[must_use]
    pub fn selector(&self) -> &PuzzleTypeSelector {
        &self.selector
    }
}

/// Room extents for `complexity`.
#[must_use]
pub fn dimensions(complexity: Complexity) -> Dimensions {
    Dimensions::for_complexity(complexity)
}

/// Layout chosen by complexity band.
#[must_use]
pub fn layout(complexity: Complexity) -> RoomLayout {
    RoomLayout::for_complexity(complexity)
}

/// Evenly spaced position on a ring around the room centre.
#[must_use]
pub fn puzzle_position(dimensions: Dimensions, index: usize, count: usize) -> Position {
    let radius = RING_RADIUS_FRACTION * dimensions.floor_span();
    let angle = (360.0 / count.max(1) as f32 * index as f32).to_radians();
    Position::new(radius * angle.cos(), INTERACTION_HEIGHT, radius * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::{dimensions, layout, puzzle_position, ContentGenerator, GenerationConfig};
    use puzzle_director_core::{Complexity, PerformanceSnapshot, RoomLayout};
    use puzzle_director_system_puzzle_selection::PuzzleTypeSelector;

    fn generator() -> ContentGenerator {
        ContentGenerator::new(&GenerationConfig::default(), PuzzleTypeSelector::default())
    }

    #[test]
    fn complexity_interpolates_between_bounds() {
        let generator = generator();
        let weakest = PerformanceSnapshot {
            average_performance: 0.0,
            success_rate: 0.0,
            ..PerformanceSnapshot::NEUTRAL
        };
        let strongest = PerformanceSnapshot {
            average_performance: 1.0,
            success_rate: 1.0,
            ..PerformanceSnapshot::NEUTRAL
        };
        assert_eq!(generator.room_complexity(&weakest), Complexity::new(1));
        assert_eq!(generator.room_complexity(&strongest), Complexity::new(10));
    }

    #[test]
    fn single_puzzle_uses_room_complexity() {
        let generator = generator();
        let difficulty = generator.puzzle_difficulty(Complexity::new(4), 0, 1);
        assert_eq!(difficulty.get(), 4);
        let last = generator.puzzle_difficulty(Complexity::new(4), 3, 4);
        assert_eq!(last.get(), 6);
    }

    #[test]
    fn structure_scales_with_complexity() {
        let small = dimensions(Complexity::new(2));
        assert_eq!(small.width, 9.0);
        assert!((small.height - 4.2).abs() < 1e-6);
        assert_eq!(layout(Complexity::new(3)), RoomLayout::Open);
        assert_eq!(layout(Complexity::new(6)), RoomLayout::Ringed);
        assert_eq!(layout(Complexity::new(7)), RoomLayout::Tiered);
    }

    #[test]
    fn positions_sit_on_ring_at_interaction_height() {
        let dims = dimensions(Complexity::new(4));
        let radius = 0.35 * dims.width;
        for index in 0..5 {
            let position = puzzle_position(dims, index, 5);
            assert_eq!(position.y, 1.0);
            let planar = (position.x * position.x + position.z * position.z).sqrt();
            assert!((planar - radius).abs() < 1e-4);
        }
    }
}
