#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a simulated Puzzle Director session.

mod logging;
mod profile;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use puzzle_director_core::{Complexity, Event, PerformanceSnapshot, MAX_DIFFICULTY};
use puzzle_director_system_scheduler::{Director, DirectorConfig};
use puzzle_director_world::{query, PoolStats};
use serde::Serialize;
use tracing::info;

use crate::profile::{Profile, SyntheticPlayer};

const CONSUME_INTERVAL: Duration = Duration::from_secs(45);
const PLAYER_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Command-line options for a simulated session.
#[derive(Debug, Parser)]
#[command(name = "puzzle-director", about = "Runs a simulated adaptive puzzle session")]
struct Args {
    /// TOML configuration file; every table and field is optional.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the session seed from the configuration.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated session length in seconds.
    #[arg(long, default_value_t = 600.0)]
    duration: f64,
    /// Simulated time advanced per tick, in milliseconds.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,
    /// Synthetic player behaviour.
    #[arg(long, value_enum, default_value_t = Profile::Steady)]
    profile: Profile,
    /// Writes the final content pool as JSON to this path.
    #[arg(long)]
    export: Option<PathBuf>,
    /// Prints the session summary as JSON.
    #[arg(long)]
    json: bool,
    /// Tracing filter directive, for example `debug` or `puzzle_director=trace`.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Default, Serialize)]
struct Tally {
    rooms_generated: usize,
    puzzles_generated: usize,
    rooms_consumed: usize,
    rooms_evicted: usize,
    difficulty_changes: usize,
    generation_interrupted: usize,
    insights: Vec<String>,
    patterns: Vec<String>,
}

impl Tally {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::RoomGenerated { .. } => self.rooms_generated += 1,
                Event::PuzzleGenerated { .. } => self.puzzles_generated += 1,
                Event::RoomConsumed { .. } => self.rooms_consumed += 1,
                Event::RoomEvicted { .. } => self.rooms_evicted += 1,
                Event::DifficultyChanged(_) => self.difficulty_changes += 1,
                Event::GenerationCancelled { .. } | Event::GenerationAbandoned { .. } => {
                    self.generation_interrupted += 1;
                }
                Event::InsightDetected(insight) => self.insights.push(insight.message.clone()),
                Event::BehaviorPatternDetected(pattern) => {
                    self.patterns.push(pattern.description.clone());
                }
                _ => {}
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct SessionSummary {
    profile: Profile,
    seed: u64,
    duration_secs: f64,
    ticks: u64,
    difficulty: f32,
    difficulty_target: f32,
    performance: PerformanceSnapshot,
    pool: PoolStats,
    #[serde(flatten)]
    tally: Tally,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_tracing(&args.log_level);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.scheduler.session_seed = seed;
    }
    let mut director = Director::new(&config).context("invalid director configuration")?;
    let summary = run_session(&args, &mut director, config.scheduler.session_seed)?;

    if let Some(path) = &args.export {
        let pool = serde_json::to_string_pretty(query::pool(director.world()))
            .context("failed to serialize content pool")?;
        fs::write(path, pool)
            .with_context(|| format!("failed to write content pool to {}", path.display()))?;
        info!(path = %path.display(), "content pool exported");
    }

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&summary).context("failed to serialize session summary")?;
        println!("{rendered}");
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<DirectorConfig> {
    let Some(path) = path else {
        return Ok(DirectorConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse configuration {}", path.display()))
}

fn run_session(args: &Args, director: &mut Director, seed: u64) -> Result<SessionSummary> {
    ensure!(args.tick_ms > 0, "--tick-ms must be greater than zero");
    ensure!(
        args.duration.is_finite() && args.duration >= 0.0,
        "--duration must be a non-negative number of seconds"
    );

    let dt = Duration::from_millis(args.tick_ms);
    let end = Duration::from_secs_f64(args.duration);
    let mut player = SyntheticPlayer::new(args.profile, seed ^ PLAYER_SEED_SALT);
    let mut tally = Tally::default();
    let mut events = Vec::new();
    let mut since_consume = Duration::ZERO;
    let mut ticks = 0u64;

    info!(profile = ?args.profile, seed, duration_secs = args.duration, "session started");
    while query::now(director.world()).elapsed() < end {
        let now = query::now(director.world());
        director.record_telemetry(player.telemetry(now));
        let difficulty = director.controller().current();
        if let Some(outcome) = player.outcome(now, dt, difficulty) {
            director.record_outcome(outcome);
        }

        since_consume += dt;
        if since_consume >= CONSUME_INTERVAL {
            since_consume = Duration::ZERO;
            let wanted = Complexity::new(difficulty.round().clamp(0.0, f32::from(MAX_DIFFICULTY)) as u8);
            if let Some(room) = query::room_for_complexity(director.world(), wanted) {
                director.consume_room(room.id);
            }
        }

        events.clear();
        director.tick(dt, &mut events);
        tally.record(&events);
        ticks += 1;
    }

    let state = director.controller().state();
    info!(
        ticks,
        rooms = tally.rooms_generated,
        difficulty = state.current,
        "session finished"
    );

    Ok(SessionSummary {
        profile: args.profile,
        seed,
        duration_secs: query::now(director.world()).elapsed().as_secs_f64(),
        ticks,
        difficulty: state.current,
        difficulty_target: state.target,
        performance: director.snapshot(),
        pool: query::pool_stats(director.world()),
        tally,
    })
}

fn print_summary(summary: &SessionSummary) {
    let performance = &summary.performance;
    let tally = &summary.tally;
    println!(
        "profile {:?}, seed {}, {:.1}s over {} ticks",
        summary.profile, summary.seed, summary.duration_secs, summary.ticks
    );
    println!(
        "difficulty {:.2} (target {:.2}), {} changes",
        summary.difficulty, summary.difficulty_target, tally.difficulty_changes
    );
    println!(
        "engagement {:.2}, frustration {:.2}, mastery {:.2}, success rate {:.2}",
        performance.engagement, performance.frustration, performance.mastery, performance.success_rate
    );
    println!(
        "rooms generated {}, consumed {}, evicted {}, interrupted {}",
        tally.rooms_generated, tally.rooms_consumed, tally.rooms_evicted, tally.generation_interrupted
    );
    println!(
        "pool {} rooms, average quality {:.1}, average complexity {:.1}",
        summary.pool.count, summary.pool.average_quality, summary.pool.average_complexity
    );
    for insight in &tally.insights {
        println!("insight: {insight}");
    }
    for pattern in &tally.patterns {
        println!("pattern: {pattern}");
    }
}
