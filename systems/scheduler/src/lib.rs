#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Single-threaded tick scheduler that wires the director together.
//!
//! Each [`Director::tick`] applies queued input to the world, feeds the
//! telemetry sink and analyzer, then runs the periodic tasks in a fixed
//! order: detection, difficulty control and generation. Every task runs to
//! completion before the next starts, so components never observe each other
//! mid-update. Generation is split into stages that advance one per tick and
//! check for cancellation in between. A job is abandoned once the execution
//! time of its stages exceeds the configured timeout; the gap between ticks
//! is not charged to it.

mod cancellation;
mod config;
mod job;
mod schedule;

use std::time::{Duration, Instant};

use puzzle_director_core::{
    BehaviorPattern, Command, Complexity, ConfigError, DifficultyChange, Event, GeneratedPuzzle,
    GeneratedRoom, GenerationStage, Insight, Observers, PerformanceSnapshot, RawPuzzleOutcome,
    RawTelemetry, RoomId, SessionTime,
};
use puzzle_director_system_analytics::PerformanceAnalyzer;
use puzzle_director_system_content_generation::ContentGenerator;
use puzzle_director_system_difficulty::DifficultyController;
use puzzle_director_system_puzzle_selection::PuzzleTypeSelector;
use puzzle_director_system_telemetry::TelemetrySink;
use puzzle_director_system_validation::QualityValidator;
use puzzle_director_world::{self as world, query, World};
use tracing::{debug, info, warn};

pub use cancellation::CancellationToken;
pub use config::{DirectorConfig, SchedulerConfig, MAX_INTERVAL_SECS};

use crate::job::{GenerationJob, JobState};
use crate::schedule::PeriodicTask;

/// Subscription registries, one per notification category.
#[derive(Debug, Default)]
pub struct DirectorObservers {
    /// Meaningful difficulty moves.
    pub difficulty: Observers<DifficultyChange>,
    /// Rooms that completed generation and validation.
    pub rooms: Observers<GeneratedRoom>,
    /// Puzzles of completed rooms.
    pub puzzles: Observers<GeneratedPuzzle>,
    /// Trend insights.
    pub insights: Observers<Insight>,
    /// Behavior patterns.
    pub patterns: Observers<BehaviorPattern>,
    /// Rooms evicted from the pool.
    pub evictions: Observers<RoomId>,
}

impl DirectorObservers {
    fn dispatch(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::DifficultyChanged(change) => self.difficulty.notify(change),
                Event::RoomGenerated { room } => self.rooms.notify(room),
                Event::PuzzleGenerated { puzzle } => self.puzzles.notify(puzzle),
                Event::InsightDetected(insight) => self.insights.notify(insight),
                Event::BehaviorPatternDetected(pattern) => self.patterns.notify(pattern),
                Event::RoomEvicted { room } => self.evictions.notify(room),
                _ => {}
            }
        }
    }
}

#[derive(Debug)]
struct Tasks {
    analytics: PeriodicTask,
    difficulty: PeriodicTask,
    generation: PeriodicTask,
}

/// Adaptive difficulty and procedural content director.
#[derive(Debug)]
pub struct Director {
    world: World,
    sink: TelemetrySink,
    analyzer: PerformanceAnalyzer,
    controller: DifficultyController,
    generator: ContentGenerator,
    validator: QualityValidator,
    tasks: Tasks,
    job: Option<GenerationJob>,
    jobs_started: u64,
    session_seed: u64,
    generation_timeout: Duration,
    shutdown: CancellationToken,
    pending: Vec<Command>,
    observers: DirectorObservers,
}

impl Director {
    /// Builds a director after validating `config`.
    pub fn new(config: &DirectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let selector = PuzzleTypeSelector::new(&config.selection)?;
        let min_complexity = config
            .generation
            .min_room_complexity
            .min(config.generation.max_room_complexity);
        let scheduler = &config.scheduler;

        Ok(Self {
            world: World::new(scheduler.pool_capacity),
            sink: TelemetrySink::new(&config.telemetry),
            analyzer: PerformanceAnalyzer::new(&config.analytics),
            controller: DifficultyController::new(&config.difficulty),
            generator: ContentGenerator::new(&config.generation, selector),
            validator: QualityValidator::new(&config.validation, Complexity::new(min_complexity)),
            tasks: Tasks {
                analytics: PeriodicTask::new(scheduler.analytics_interval()?),
                difficulty: PeriodicTask::new(scheduler.difficulty_interval()?),
                generation: PeriodicTask::new(scheduler.generation_interval()?),
            },
            job: None,
            jobs_started: 0,
            session_seed: scheduler.session_seed,
            generation_timeout: scheduler.generation_timeout()?,
            shutdown: CancellationToken::new(),
            pending: Vec::new(),
            observers: DirectorObservers::default(),
        })
    }

    /// Queues a telemetry sample for the next tick.
    pub fn record_telemetry(&mut self, telemetry: RawTelemetry) {
        self.pending.push(Command::RecordTelemetry { telemetry });
    }

    /// Queues a puzzle outcome for the next tick.
    pub fn record_outcome(&mut self, outcome: RawPuzzleOutcome) {
        self.pending.push(Command::RecordOutcome { outcome });
    }

    /// Queues removal of a resident room handed to the scene-assembly collaborator.
    pub fn consume_room(&mut self, room: RoomId) {
        self.pending.push(Command::ConsumeRoom { room });
    }

    /// Starts a generation job outside the schedule, even when the pool is
    /// full; the oldest room is then evicted on commit.
    ///
    /// Returns `false` when a job is already running or the director is shut down.
    pub fn request_generation(&mut self) -> bool {
        if self.job.is_some() || self.shutdown.is_cancelled() {
            return false;
        }
        self.start_job();
        true
    }

    /// Cancels the in-flight job, if any. The job is dropped on the next tick.
    pub fn cancel_generation(&self) {
        if let Some(job) = &self.job {
            job.token.cancel();
        }
    }

    /// Token that stops all current and future generation once cancelled.
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Reports whether a generation job is in flight.
    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.job.is_some()
    }

    /// Stage the in-flight job runs next.
    #[must_use]
    pub fn generation_stage(&self) -> Option<GenerationStage> {
        self.job.as_ref().map(GenerationJob::stage)
    }

    /// Advances the session by `dt` and runs every due task.
    pub fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let first_new = out_events.len();

        let mut world_events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut world_events);
        for command in self.pending.drain(..) {
            world::apply(&mut self.world, command, &mut world_events);
        }

        let mut readings = Vec::new();
        let mut attempts = Vec::new();
        self.sink.handle(&world_events, &mut readings, &mut attempts);
        self.analyzer.handle(&readings, &attempts);
        out_events.append(&mut world_events);

        let now = query::now(&self.world);
        if self.tasks.analytics.poll(now).is_some() {
            self.analyzer.analyze(now, out_events);
        }
        if let Some(elapsed) = self.tasks.difficulty.poll(now) {
            let snapshot = self.analyzer.snapshot();
            if let Some(change) = self.controller.tick(snapshot.average_performance, elapsed) {
                out_events.push(Event::DifficultyChanged(change));
            }
        }
        if self.tasks.generation.poll(now).is_some()
            && self.job.is_none()
            && query::pool_has_capacity(&self.world)
            && !self.shutdown.is_cancelled()
        {
            self.start_job();
        }
        self.advance_job(now, out_events);

        self.observers.dispatch(&out_events[first_new..]);
    }

    fn start_job(&mut self) {
        let now = query::now(&self.world);
        let job = GenerationJob::new(self.session_seed, self.jobs_started);
        self.jobs_started = self.jobs_started.saturating_add(1);
        debug!(job = self.jobs_started, at = %now, "generation job started");
        self.job = Some(job);
    }

    fn advance_job(&mut self, now: SessionTime, out_events: &mut Vec<Event>) {
        let Some(mut job) = self.job.take() else {
            return;
        };
        let stage = job.stage();

        if job.token.is_cancelled() || self.shutdown.is_cancelled() {
            info!(?stage, "generation cancelled");
            out_events.push(Event::GenerationCancelled { stage });
            return;
        }

        let started = Instant::now();
        let next = match job.state {
            JobState::Structure => {
                let snapshot = self.analyzer.snapshot();
                let blueprint = self.generator.build_structure(
                    &snapshot,
                    self.controller.current(),
                    now,
                    &mut job.generation_rng,
                );
                JobState::Puzzles(blueprint)
            }
            JobState::Puzzles(blueprint) => {
                let room = self
                    .generator
                    .populate_puzzles(blueprint, &mut job.generation_rng);
                JobState::Validation(room)
            }
            JobState::Validation(mut room) => {
                let report = self.validator.validate(&mut room, &mut job.overlap_rng);
                debug!(
                    room = room.id.get(),
                    residual_overlaps = report.residual_overlaps,
                    complexity_reduced = report.complexity_reduced,
                    "validation stage complete"
                );
                JobState::Commit(room)
            }
            JobState::Commit(room) => {
                self.commit(room, out_events);
                return;
            }
        };

        job.busy = job.busy.saturating_add(started.elapsed());
        if job.busy > self.generation_timeout {
            warn!(
                ?stage,
                busy_secs = job.busy.as_secs_f32(),
                "generation abandoned after timeout"
            );
            out_events.push(Event::GenerationAbandoned {
                stage,
                elapsed: job.busy,
            });
            return;
        }
        job.state = next;
        self.job = Some(job);
    }

    fn commit(&mut self, room: GeneratedRoom, out_events: &mut Vec<Event>) {
        info!(
            room = room.id.get(),
            name = %room.name,
            complexity = room.complexity.get(),
            puzzles = room.puzzles.len(),
            quality = room.quality_score,
            "room generated"
        );
        for puzzle in &room.puzzles {
            out_events.push(Event::PuzzleGenerated {
                puzzle: Box::new(puzzle.clone()),
            });
        }
        out_events.push(Event::RoomGenerated {
            room: Box::new(room.clone()),
        });
        world::apply(
            &mut self.world,
            Command::StoreRoom {
                room: Box::new(room),
            },
            out_events,
        );
    }

    /// Latest analyzer summary.
    #[must_use]
    pub fn snapshot(&self) -> PerformanceSnapshot {
        self.analyzer.snapshot()
    }

    /// Authoritative world state for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Performance analyzer.
    #[must_use]
    pub fn analyzer(&self) -> &PerformanceAnalyzer {
        &self.analyzer
    }

    /// Difficulty controller.
    #[must_use]
    pub fn controller(&self) -> &DifficultyController {
        &self.controller
    }

    /// Telemetry sink counters.
    #[must_use]
    pub fn sink(&self) -> &TelemetrySink {
        &self.sink
    }

    /// Subscription registries.
    pub fn observers_mut(&mut self) -> &mut DirectorObservers {
        &mut self.observers
    }
}
