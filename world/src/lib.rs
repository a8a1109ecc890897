#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for the Puzzle Director.
//!
//! The world owns the session clock and the [`ContentPool`]. It is mutated
//! exclusively through [`apply`], which stamps incoming telemetry with the
//! session time and broadcasts [`Event`] values for systems to consume.

mod pool;

use std::time::Duration;

use puzzle_director_core::{Command, Event, SessionTime};
use tracing::{debug, info};

pub use pool::{ContentPool, PoolStats};

const DEFAULT_POOL_CAPACITY: usize = 10;

/// Represents the authoritative Puzzle Director session state.
#[derive(Debug)]
pub struct World {
    clock: SessionTime,
    tick_index: u64,
    pool: ContentPool,
}

impl World {
    /// Creates a new world whose pool holds at most `pool_capacity` rooms.
    #[must_use]
    pub fn new(pool_capacity: usize) -> Self {
        Self {
            clock: SessionTime::ZERO,
            tick_index: 0,
            pool: ContentPool::new(pool_capacity),
        }
    }

    fn advance(&mut self, dt: Duration) {
        self.clock = self.clock.advanced_by(dt);
        self.tick_index = self.tick_index.saturating_add(1);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.advance(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::RecordTelemetry { telemetry } => {
            out_events.push(Event::TelemetryReceived {
                telemetry,
                at: world.clock,
            });
        }
        Command::RecordOutcome { outcome } => {
            out_events.push(Event::OutcomeReported {
                outcome,
                at: world.clock,
            });
        }
        Command::StoreRoom { room } => {
            let id = room.id;
            let evicted = world.pool.add(*room);
            info!(room = id.get(), resident = world.pool.len(), "room stored");
            out_events.push(Event::RoomStored { room: id });
            if let Some(evicted) = evicted {
                debug!(room = evicted.id.get(), "room evicted from pool");
                out_events.push(Event::RoomEvicted { room: evicted.id });
            }
        }
        Command::ConsumeRoom { room } => {
            if world.pool.remove(room).is_some() {
                debug!(room = room.get(), "room consumed");
                out_events.push(Event::RoomConsumed { room });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use puzzle_director_core::{Complexity, GeneratedRoom, RoomId, SessionTime};

    use super::{ContentPool, PoolStats, World};

    /// Current session time.
    #[must_use]
    pub fn now(world: &World) -> SessionTime {
        world.clock
    }

    /// Number of ticks applied since the session started.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Provides read-only access to the content pool.
    #[must_use]
    pub fn pool(world: &World) -> &ContentPool {
        &world.pool
    }

    /// Looks up a resident room for the scene-assembly collaborator.
    #[must_use]
    pub fn room(world: &World, id: RoomId) -> Option<&GeneratedRoom> {
        world.pool.get(id)
    }

    /// Resident room best matching the requested complexity.
    #[must_use]
    pub fn room_for_complexity(world: &World, complexity: Complexity) -> Option<&GeneratedRoom> {
        world.pool.closest_to_complexity(complexity)
    }

    /// Aggregate statistics over the resident rooms.
    #[must_use]
    pub fn pool_stats(world: &World) -> PoolStats {
        world.pool.stats()
    }

    /// Reports whether the pool has room for another generated room.
    #[must_use]
    pub fn pool_has_capacity(world: &World) -> bool {
        !world.pool.is_full()
    }
}
