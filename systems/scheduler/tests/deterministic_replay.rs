use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use puzzle_director_core::{
    Event, GenerationStage, PlayerId, PuzzleCategory, RawPuzzleOutcome, RawTelemetry,
};
use puzzle_director_system_scheduler::{Director, DirectorConfig, SchedulerConfig};
use puzzle_director_world::query;

#[test]
fn deterministic_replay_produces_identical_sessions() {
    let first = replay(7);
    let second = replay(7);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(first.events.iter().any(|event| matches!(event, EventRecord::RoomGenerated { .. })));
}

#[test]
fn session_seed_changes_generated_content() {
    let rooms = |seed| {
        replay(seed)
            .rooms
            .into_iter()
            .map(|room| room.puzzles)
            .collect::<Vec<_>>()
    };
    let baseline = rooms(1);
    let differs = (2..6).any(|seed| rooms(seed) != baseline);
    assert!(differs, "every seed produced the same rooms");
}

fn replay(seed: u64) -> ReplayOutcome {
    let config = DirectorConfig {
        scheduler: SchedulerConfig {
            session_seed: seed,
            generation_interval_secs: 5.0,
            ..SchedulerConfig::default()
        },
        ..DirectorConfig::default()
    };
    let mut director = Director::new(&config).expect("valid director config");
    let mut log = Vec::new();

    for tick in 0u32..240 {
        let wave = (tick % 20) as f32 / 20.0;
        director.record_telemetry(RawTelemetry {
            movement_intensity: wave,
            interaction_frequency: 1.0 - wave,
            puzzle_progress: wave,
            active_puzzle_count: tick % 3,
        });
        if tick % 10 == 0 {
            director.record_outcome(RawPuzzleOutcome {
                category: PuzzleCategory::ALL[(tick / 10) as usize % PuzzleCategory::ALL.len()],
                player: PlayerId::new(0),
                success: tick % 20 == 0,
                completion_time_secs: 45.0 + tick as f32,
                difficulty_at_attempt: 5.0,
            });
        }
        let mut events = Vec::new();
        director.tick(Duration::from_millis(250), &mut events);
        log.extend(events.iter().map(EventRecord::from));
    }

    let rooms = query::pool(director.world())
        .iter()
        .map(RoomState::from)
        .collect();
    ReplayOutcome { rooms, events: log }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    rooms: Vec<RoomState>,
    events: Vec<EventRecord>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct RoomState {
    id: u64,
    complexity: u8,
    theme: Option<String>,
    quality_bits: u32,
    puzzles: Vec<(String, u8, i64, i64)>,
}

impl From<&puzzle_director_core::GeneratedRoom> for RoomState {
    fn from(room: &puzzle_director_core::GeneratedRoom) -> Self {
        Self {
            id: room.id.get(),
            complexity: room.complexity.get(),
            theme: room.theme.map(|theme| theme.label().to_owned()),
            quality_bits: room.quality_score.to_bits(),
            puzzles: room
                .puzzles
                .iter()
                .map(|puzzle| {
                    (
                        puzzle.category.label().to_owned(),
                        puzzle.difficulty.get(),
                        (puzzle.position.x * 1_000.0).round() as i64,
                        (puzzle.position.z * 1_000.0).round() as i64,
                    )
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum EventRecord {
    TimeAdvanced { dt_micros: u128 },
    DifficultyChanged { previous_bits: u32, current_bits: u32 },
    RoomGenerated { room: u64 },
    RoomStored { room: u64 },
    Insight { message: String },
    Pattern { description: String },
    Interrupted { stage: GenerationStage },
    Other,
}

impl From<&Event> for EventRecord {
    fn from(event: &Event) -> Self {
        match event {
            Event::TimeAdvanced { dt } => Self::TimeAdvanced {
                dt_micros: dt.as_micros(),
            },
            Event::DifficultyChanged(change) => Self::DifficultyChanged {
                previous_bits: change.previous.to_bits(),
                current_bits: change.current.to_bits(),
            },
            Event::RoomGenerated { room } => Self::RoomGenerated { room: room.id.get() },
            Event::RoomStored { room } => Self::RoomStored { room: room.get() },
            Event::InsightDetected(insight) => Self::Insight {
                message: insight.message.clone(),
            },
            Event::BehaviorPatternDetected(pattern) => Self::Pattern {
                description: pattern.description.clone(),
            },
            Event::GenerationCancelled { stage } | Event::GenerationAbandoned { stage, .. } => {
                Self::Interrupted { stage: *stage }
            }
            _ => Self::Other,
        }
    }
}
