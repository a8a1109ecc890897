#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Puzzle Director engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative session world, and pure systems. Adapters submit [`Command`]
//! values describing raw telemetry and desired mutations, the world executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values for systems to react to deterministically. Systems consume event
//! streams, query immutable snapshots, and respond with descriptors, control
//! signals, or new command batches.

mod error;
mod observers;
mod window;

use std::{collections::BTreeMap, fmt, time::Duration};

use serde::{Deserialize, Serialize};

pub use error::ConfigError;
pub use observers::{ObserverId, Observers};
pub use window::RollingWindow;

/// Lowest difficulty any puzzle or control loop may express.
pub const MIN_DIFFICULTY: u8 = 1;
/// Highest difficulty any puzzle or control loop may express.
pub const MAX_DIFFICULTY: u8 = 10;

/// Window during which a repeated insight or behavior pattern is suppressed.
pub const DETECTION_COOLDOWN: Duration = Duration::from_secs(300);

/// Commands that express all permissible mutations of the session world.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the session clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Submits a continuous telemetry sample captured by a collaborator.
    RecordTelemetry {
        /// Raw, unnormalized telemetry values.
        telemetry: RawTelemetry,
    },
    /// Reports the outcome of a single puzzle attempt.
    RecordOutcome {
        /// Raw outcome reported by the scene-assembly collaborator.
        outcome: RawPuzzleOutcome,
    },
    /// Requests that a validated room be stored in the content pool.
    StoreRoom {
        /// Room that passed through the validation pipeline.
        room: Box<GeneratedRoom>,
    },
    /// Hands a resident room to the scene-assembly collaborator, removing it from the pool.
    ConsumeRoom {
        /// Room being consumed.
        room: RoomId,
    },
}

/// Events broadcast by the world and the systems after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Raw telemetry was accepted and stamped by the world.
    TelemetryReceived {
        /// Raw telemetry values as submitted.
        telemetry: RawTelemetry,
        /// Session time at which the sample was accepted.
        at: SessionTime,
    },
    /// A puzzle outcome was accepted and stamped by the world.
    OutcomeReported {
        /// Raw outcome as submitted.
        outcome: RawPuzzleOutcome,
        /// Session time at which the outcome was accepted.
        at: SessionTime,
    },
    /// A room entered the content pool.
    RoomStored {
        /// Identifier of the stored room.
        room: RoomId,
    },
    /// The oldest room was evicted to keep the pool within capacity.
    RoomEvicted {
        /// Identifier of the evicted room.
        room: RoomId,
    },
    /// A resident room was handed out and left the pool.
    RoomConsumed {
        /// Identifier of the consumed room.
        room: RoomId,
    },
    /// The smoothed difficulty moved meaningfully during a control tick.
    DifficultyChanged(DifficultyChange),
    /// A room finished generation and validation.
    RoomGenerated {
        /// Complete room descriptor.
        room: Box<GeneratedRoom>,
    },
    /// A puzzle descriptor was produced for a room under generation.
    PuzzleGenerated {
        /// Complete puzzle descriptor.
        puzzle: Box<GeneratedPuzzle>,
    },
    /// Trend analysis produced a named insight.
    InsightDetected(Insight),
    /// Behavior analysis recognised a pattern.
    BehaviorPatternDetected(BehaviorPattern),
    /// An in-flight generation job was cancelled before it reached the pool.
    GenerationCancelled {
        /// Stage the job was about to run.
        stage: GenerationStage,
    },
    /// An in-flight generation job exceeded its time allowance and was dropped.
    GenerationAbandoned {
        /// Stage whose work pushed the job over its allowance.
        stage: GenerationStage,
        /// Execution time spent in the job's stages so far.
        elapsed: Duration,
    },
}

/// Stages of the room generation pipeline, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenerationStage {
    /// Complexity, theme, dimensions and layout.
    Structure,
    /// Puzzle descriptors.
    Puzzles,
    /// Overlap resolution, cost check, comfort flags and scoring.
    Validation,
    /// Hand-off to the content pool.
    Commit,
}

/// Point on the session clock measured from session start.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SessionTime(Duration);

impl SessionTime {
    /// Start of the session.
    pub const ZERO: Self = Self(Duration::ZERO);

    /// Creates a session time from the elapsed duration.
    #[must_use]
    pub const fn new(elapsed: Duration) -> Self {
        Self(elapsed)
    }

    /// Creates a session time from whole seconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    /// Duration elapsed since the session started.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.0
    }

    /// Advances the time by `dt`, saturating on overflow.
    #[must_use]
    pub fn advanced_by(self, dt: Duration) -> Self {
        Self(self.0.saturating_add(dt))
    }

    /// Duration between `earlier` and `self`, or zero if `earlier` is later.
    #[must_use]
    pub fn saturating_since(self, earlier: SessionTime) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for SessionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}s", self.0.as_secs_f64())
    }
}

/// Unique identifier assigned to a generated room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(u64);

impl RoomId {
    /// Creates a new room identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Unique identifier assigned to a generated puzzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PuzzleId(u64);

impl PuzzleId {
    /// Creates a new puzzle identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Identifier of the player who produced an outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Enumerated kinds of puzzles the director can generate.
///
/// Declaration order is the canonical order used when walking cumulative
/// distributions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PuzzleCategory {
    /// Carry relics to their pedestals.
    RelicPlacement,
    /// Perform and hold hand gestures.
    Gesture,
    /// Match symbol patterns.
    PatternMatching,
    /// Repeat a displayed sequence.
    Sequence,
    /// Satisfy switch constraints.
    Logic,
    /// Balance and stack physical objects.
    Physics,
    /// Dial in a combination.
    Combination,
}

impl PuzzleCategory {
    /// Every category in canonical order.
    pub const ALL: [Self; 7] = [
        Self::RelicPlacement,
        Self::Gesture,
        Self::PatternMatching,
        Self::Sequence,
        Self::Logic,
        Self::Physics,
        Self::Combination,
    ];

    /// Position of the category within [`PuzzleCategory::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RelicPlacement => "relic placement",
            Self::Gesture => "gesture",
            Self::PatternMatching => "pattern matching",
            Self::Sequence => "sequence",
            Self::Logic => "logic",
            Self::Physics => "physics",
            Self::Combination => "combination",
        }
    }
}

/// Aesthetic and narrative context of a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Theme {
    /// Sandstone halls and relic altars.
    AncientTemple,
    /// Glowing crystal formations.
    CrystalCavern,
    /// Gears, levers and brass machinery.
    ClockworkWorkshop,
    /// Vines, ruins and living plants.
    OvergrownGarden,
    /// Quiet, unadorned space.
    Sanctuary,
}

impl Theme {
    /// Every theme in canonical order.
    pub const ALL: [Self; 5] = [
        Self::AncientTemple,
        Self::CrystalCavern,
        Self::ClockworkWorkshop,
        Self::OvergrownGarden,
        Self::Sanctuary,
    ];

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AncientTemple => "Ancient Temple",
            Self::CrystalCavern => "Crystal Cavern",
            Self::ClockworkWorkshop => "Clockwork Workshop",
            Self::OvergrownGarden => "Overgrown Garden",
            Self::Sanctuary => "Sanctuary",
        }
    }
}

/// Integer knob controlling room size, puzzle count and visual cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Complexity(u8);

impl Complexity {
    /// Creates a complexity value clamped into `[min, max]`.
    #[must_use]
    pub fn clamped(value: i32, min: Complexity, max: Complexity) -> Self {
        let low = i32::from(min.0.min(max.0));
        let high = i32::from(max.0.max(min.0));
        Self(value.clamp(low, high) as u8)
    }

    /// Creates a complexity value without bounds checking.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the underlying integer.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Per-puzzle difficulty, always within [`MIN_DIFFICULTY`]..=[`MAX_DIFFICULTY`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PuzzleDifficulty(u8);

impl PuzzleDifficulty {
    /// Creates a difficulty clamped into the global bounds.
    #[must_use]
    pub fn new(value: i32) -> Self {
        Self(value.clamp(i32::from(MIN_DIFFICULTY), i32::from(MAX_DIFFICULTY)) as u8)
    }

    /// Retrieves the underlying integer.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Difficulty as a float for parameter formulas.
    #[must_use]
    pub fn as_f32(&self) -> f32 {
        f32::from(self.0)
    }
}

/// Continuous telemetry captured by an input collaborator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTelemetry {
    /// Head and hand movement magnitude, unbounded.
    pub movement_intensity: f32,
    /// Interactions per sampling interval, expected within [0,1].
    pub interaction_frequency: f32,
    /// Progress through the active puzzle, expected within [0,1].
    pub puzzle_progress: f32,
    /// Number of puzzles currently active around the player.
    pub active_puzzle_count: u32,
}

/// Raw outcome of a single puzzle attempt.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawPuzzleOutcome {
    /// Category of the attempted puzzle.
    pub category: PuzzleCategory,
    /// Player who attempted it.
    pub player: PlayerId,
    /// Whether the puzzle was solved.
    pub success: bool,
    /// Time spent on the attempt in seconds.
    pub completion_time_secs: f32,
    /// Difficulty the puzzle had when attempted.
    pub difficulty_at_attempt: f32,
}

/// Normalized, timestamped telemetry produced by the telemetry sink.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReading {
    /// Session time the reading was accepted.
    pub timestamp: SessionTime,
    /// Movement intensity normalized to [0,1].
    pub movement_intensity: f32,
    /// Interaction frequency within [0,1].
    pub interaction_frequency: f32,
    /// Puzzle progress within [0,1].
    pub puzzle_progress: f32,
    /// Number of active puzzles.
    pub active_puzzle_count: u32,
}

/// Normalized, timestamped puzzle attempt produced by the telemetry sink.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PuzzleAttempt {
    /// Session time the outcome was accepted.
    pub timestamp: SessionTime,
    /// Category of the attempted puzzle.
    pub category: PuzzleCategory,
    /// Player who attempted it.
    pub player: PlayerId,
    /// Whether the puzzle was solved.
    pub success: bool,
    /// Non-negative time spent on the attempt in seconds.
    pub completion_time_secs: f32,
    /// Difficulty within the global bounds.
    pub difficulty: f32,
}

/// Immutable performance observation stored in the analyzer's rolling window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    timestamp: SessionTime,
    engagement: f32,
    frustration: f32,
    mastery: f32,
    active_puzzle_count: u32,
    movement_intensity: f32,
    interaction_frequency: f32,
    puzzle_progress: f32,
}

impl PerformanceSample {
    /// Builds a sample from a reading and the scores derived for it.
    ///
    /// Every probability-like field is clamped into `[0, 1]`.
    #[must_use]
    pub fn new(reading: &TelemetryReading, engagement: f32, frustration: f32, mastery: f32) -> Self {
        Self {
            timestamp: reading.timestamp,
            engagement: unit(engagement),
            frustration: unit(frustration),
            mastery: unit(mastery),
            active_puzzle_count: reading.active_puzzle_count,
            movement_intensity: unit(reading.movement_intensity),
            interaction_frequency: unit(reading.interaction_frequency),
            puzzle_progress: unit(reading.puzzle_progress),
        }
    }

    /// Session time the sample was recorded.
    #[must_use]
    pub const fn timestamp(&self) -> SessionTime {
        self.timestamp
    }

    /// Engagement score at recording time.
    #[must_use]
    pub const fn engagement(&self) -> f32 {
        self.engagement
    }

    /// Frustration score at recording time.
    #[must_use]
    pub const fn frustration(&self) -> f32 {
        self.frustration
    }

    /// Mastery score at recording time.
    #[must_use]
    pub const fn mastery(&self) -> f32 {
        self.mastery
    }

    /// Number of active puzzles at recording time.
    #[must_use]
    pub const fn active_puzzle_count(&self) -> u32 {
        self.active_puzzle_count
    }

    /// Normalized movement intensity.
    #[must_use]
    pub const fn movement_intensity(&self) -> f32 {
        self.movement_intensity
    }

    /// Interaction frequency.
    #[must_use]
    pub const fn interaction_frequency(&self) -> f32 {
        self.interaction_frequency
    }

    /// Progress through the active puzzle.
    #[must_use]
    pub const fn puzzle_progress(&self) -> f32 {
        self.puzzle_progress
    }
}

/// Read-only summary of the analyzer state consumed by control loops.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    /// Current engagement score.
    pub engagement: f32,
    /// Current frustration score.
    pub frustration: f32,
    /// Current mastery score.
    pub mastery: f32,
    /// Blend of engagement, mastery and inverted frustration.
    pub average_performance: f32,
    /// Success rate over recent attempts.
    pub success_rate: f32,
    /// Samples currently held in the rolling window.
    pub sample_count: usize,
    /// Attempts recorded over the session.
    pub attempt_count: usize,
}

impl PerformanceSnapshot {
    /// Snapshot used before any telemetry has been observed.
    pub const NEUTRAL: Self = Self {
        engagement: 0.5,
        frustration: 0.0,
        mastery: 0.5,
        average_performance: 2.0 / 3.0,
        success_rate: 0.5,
        sample_count: 0,
        attempt_count: 0,
    };
}

impl Default for PerformanceSnapshot {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Kinds of behavior the analyzer can recognise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BehaviorPatternKind {
    /// Sustained, steady, high movement.
    ConsistentHighActivity,
    /// Steadily low interaction with puzzles.
    LowInteraction,
    /// Progress is flat and low.
    StuckOnPuzzle,
    /// Progress climbed sharply across the window.
    RapidProgress,
    /// Erratic but low movement.
    HesitantMovement,
}

/// Behavior pattern recognised over the performance window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BehaviorPattern {
    /// Recognised behavior.
    pub kind: BehaviorPatternKind,
    /// Confidence within [0,1].
    pub confidence: f32,
    /// Human readable description.
    pub description: String,
    /// Session time of detection.
    pub detected_at: SessionTime,
}

/// Named insights produced by trend detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InsightKind {
    /// Engagement dropped between the two most recent windows.
    EngagementDecline,
    /// Frustration rose between the two most recent windows.
    FrustrationIncrease,
    /// Engagement rose while frustration fell.
    OptimalFlow,
}

/// Trend insight emitted by the analyzer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// Insight category.
    pub kind: InsightKind,
    /// Confidence within [0,1].
    pub confidence: f32,
    /// Human readable message.
    pub message: String,
    /// Session time of detection.
    pub detected_at: SessionTime,
}

/// Difficulty controller state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyState {
    /// Smoothed difficulty read by downstream consumers.
    pub current: f32,
    /// Goal the smoothed value moves toward.
    pub target: f32,
    /// Lower bound of both values.
    pub min: f32,
    /// Upper bound of both values.
    pub max: f32,
}

/// Notification payload emitted when difficulty moves meaningfully.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyChange {
    /// Smoothed value before the tick.
    pub previous: f32,
    /// Smoothed value after the tick.
    pub current: f32,
}

/// Location of a puzzle relative to the room centre, in metres.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Lateral offset.
    pub x: f32,
    /// Height above the floor.
    pub y: f32,
    /// Depth offset.
    pub z: f32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance between two positions.
    #[must_use]
    pub fn distance(self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Room extents in metres.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Extent along x.
    pub width: f32,
    /// Extent along z.
    pub depth: f32,
    /// Extent along y.
    pub height: f32,
}

impl Dimensions {
    /// Room extents: `6 + 1.5c` wide and deep, `3 + 0.6c` tall.
    #[must_use]
    pub fn for_complexity(complexity: Complexity) -> Self {
        let c = f32::from(complexity.get());
        Self {
            width: 6.0 + 1.5 * c,
            depth: 6.0 + 1.5 * c,
            height: 3.0 + 0.6 * c,
        }
    }

    /// Shorter of the two floor extents.
    #[must_use]
    pub fn floor_span(self) -> f32 {
        self.width.min(self.depth)
    }
}

/// Spatial arrangement of a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomLayout {
    /// Single open floor.
    Open,
    /// Puzzles arranged on a ring around a central feature.
    Ringed,
    /// Several floor levels connected by ramps.
    Tiered,
}

impl RoomLayout {
    /// Layout chosen by complexity band.
    #[must_use]
    pub const fn for_complexity(complexity: Complexity) -> Self {
        match complexity.get() {
            0..=3 => Self::Open,
            4..=6 => Self::Ringed,
            _ => Self::Tiered,
        }
    }
}

/// Flags attached by the validator for comfort and accessibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomFlags {
    /// Comfort features such as vignetting and teleport anchors are required.
    pub comfort_features: bool,
    /// Extra accessibility cues such as highlights and audio hints are required.
    pub accessibility_cues: bool,
}

impl RoomFlags {
    /// Reports whether any comfort-related flag is set.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.comfort_features || self.accessibility_cues
    }
}

/// Pass/fail requirements attached to a puzzle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PuzzleRequirements {
    /// Minimum plausible completion time in seconds.
    pub min_time_secs: f32,
    /// Maximum allowed completion time in seconds.
    pub max_time_secs: f32,
    /// Number of discrete actions required to solve.
    pub required_action_count: u32,
    /// Fraction of correct actions needed to pass, within [0,1].
    pub success_threshold: f32,
}

/// Named tunable parameters of a puzzle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PuzzleParameters(BTreeMap<String, f32>);

impl PuzzleParameters {
    /// Creates an empty parameter table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, replacing any previous value.
    pub fn set(&mut self, name: &str, value: f32) {
        let _ = self.0.insert(name.to_owned(), value);
    }

    /// Returns a parameter value, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f32> {
        self.0.get(name).copied()
    }

    /// Iterates parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Reports whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Puzzle descriptor handed to the scene-assembly collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPuzzle {
    /// Identifier unique across the session.
    pub id: PuzzleId,
    /// Room the puzzle belongs to.
    pub room: RoomId,
    /// Puzzle kind.
    pub category: PuzzleCategory,
    /// Per-puzzle difficulty.
    pub difficulty: PuzzleDifficulty,
    /// Placement relative to the room centre.
    pub position: Position,
    /// Category-specific tunables.
    pub parameters: PuzzleParameters,
    /// Pass/fail requirements.
    pub requirements: PuzzleRequirements,
}

/// Room descriptor produced by generation and validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedRoom {
    /// Identifier unique across the session.
    pub id: RoomId,
    /// Display name.
    pub name: String,
    /// Room complexity within the configured bounds.
    pub complexity: Complexity,
    /// Theme, if any theme was enabled.
    pub theme: Option<Theme>,
    /// Room extents.
    pub dimensions: Dimensions,
    /// Spatial arrangement.
    pub layout: RoomLayout,
    /// Puzzles ordered by progression.
    pub puzzles: Vec<GeneratedPuzzle>,
    /// Comfort and accessibility flags.
    pub flags: RoomFlags,
    /// Number of level-of-detail tiers requested for the room.
    pub lod_levels: u8,
    /// Quality score within [0,100].
    pub quality_score: f32,
    /// Smoothed difficulty read from the controller at generation time.
    pub difficulty_at_generation: f32,
    /// Session time of creation.
    pub created_at: SessionTime,
}

/// Clamps a probability-like value into `[0, 1]`, mapping non-finite values to zero.
#[must_use]
pub fn unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{
        unit, Complexity, GenerationStage, PuzzleCategory, PuzzleDifficulty, PuzzleParameters,
        RoomId, SessionTime, TelemetryReading, Theme,
    };
    use serde::{de::DeserializeOwned, Serialize};
    use std::time::Duration;

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn room_id_round_trips_through_bincode() {
        assert_round_trip(&RoomId::new(42));
    }

    #[test]
    fn parameters_round_trip_through_bincode() {
        let mut parameters = PuzzleParameters::new();
        parameters.set("snapDistance", 0.2);
        parameters.set("requiredRelics", 4.0);
        assert_round_trip(&parameters);
        assert_round_trip(&GenerationStage::Validation);
    }

    #[test]
    fn categories_are_indexed_in_declaration_order() {
        for (index, category) in PuzzleCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), index);
        }
        assert_eq!(Theme::ALL.len(), 5);
    }

    #[test]
    fn puzzle_difficulty_clamps_to_global_bounds() {
        assert_eq!(PuzzleDifficulty::new(-4).get(), 1);
        assert_eq!(PuzzleDifficulty::new(7).get(), 7);
        assert_eq!(PuzzleDifficulty::new(40).get(), 10);
    }

    #[test]
    fn complexity_clamps_into_configured_bounds() {
        let min = Complexity::new(3);
        let max = Complexity::new(8);
        assert_eq!(Complexity::clamped(1, min, max).get(), 3);
        assert_eq!(Complexity::clamped(12, min, max).get(), 8);
        assert_eq!(Complexity::clamped(5, min, max).get(), 5);
    }

    #[test]
    fn unit_maps_non_finite_values_to_zero() {
        assert_eq!(unit(f32::NAN), 0.0);
        assert_eq!(unit(f32::INFINITY), 0.0);
        assert_eq!(unit(1.7), 1.0);
        assert_eq!(unit(-0.3), 0.0);
    }

    #[test]
    fn performance_sample_clamps_scores() {
        let reading = TelemetryReading {
            timestamp: SessionTime::from_secs(3),
            movement_intensity: 0.4,
            interaction_frequency: 1.4,
            puzzle_progress: -1.0,
            active_puzzle_count: 2,
        };
        let sample = super::PerformanceSample::new(&reading, 2.0, -1.0, 0.25);
        assert_eq!(sample.engagement(), 1.0);
        assert_eq!(sample.frustration(), 0.0);
        assert_eq!(sample.mastery(), 0.25);
        assert_eq!(sample.interaction_frequency(), 1.0);
        assert_eq!(sample.puzzle_progress(), 0.0);
        assert_eq!(sample.timestamp().elapsed(), Duration::from_secs(3));
    }

    #[test]
    fn session_time_saturates() {
        let earlier = SessionTime::from_secs(10);
        let later = earlier.advanced_by(Duration::from_secs(5));
        assert_eq!(later.saturating_since(earlier), Duration::from_secs(5));
        assert_eq!(earlier.saturating_since(later), Duration::ZERO);
    }
}
