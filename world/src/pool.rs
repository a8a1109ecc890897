use std::collections::VecDeque;

use puzzle_director_core::{Complexity, GeneratedRoom, RoomId};
use serde::{Deserialize, Serialize};

/// Bounded collection of accepted rooms with insertion-order eviction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContentPool {
    rooms: VecDeque<GeneratedRoom>,
    capacity: usize,
}

/// Aggregate statistics computed on demand over the pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Number of resident rooms.
    pub count: usize,
    /// Mean quality score, zero when empty.
    pub average_quality: f32,
    /// Mean room complexity, zero when empty.
    pub average_complexity: f32,
}

impl ContentPool {
    /// Creates an empty pool. A zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            rooms: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `room`, evicting and returning the oldest room once over capacity.
    pub fn add(&mut self, room: GeneratedRoom) -> Option<GeneratedRoom> {
        self.rooms.push_back(room);
        if self.rooms.len() > self.capacity {
            self.rooms.pop_front()
        } else {
            None
        }
    }

    /// Removes a resident room, preserving the order of the rest.
    pub fn remove(&mut self, id: RoomId) -> Option<GeneratedRoom> {
        let index = self.rooms.iter().position(|room| room.id == id)?;
        self.rooms.remove(index)
    }

    /// Looks up a resident room.
    #[must_use]
    pub fn get(&self, id: RoomId) -> Option<&GeneratedRoom> {
        self.rooms.iter().find(|room| room.id == id)
    }

    /// Resident room whose complexity is nearest to `complexity`, oldest first on ties.
    #[must_use]
    pub fn closest_to_complexity(&self, complexity: Complexity) -> Option<&GeneratedRoom> {
        self.rooms
            .iter()
            .min_by_key(|room| room.complexity.get().abs_diff(complexity.get()))
    }

    /// Iterates rooms from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &GeneratedRoom> {
        self.rooms.iter()
    }

    /// Number of resident rooms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Reports whether the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Reports whether the pool reached its capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.rooms.len() >= self.capacity
    }

    /// Maximum number of resident rooms.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Computes count, average quality and average complexity.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let count = self.rooms.len();
        if count == 0 {
            return PoolStats::default();
        }

        let (quality, complexity) = self.rooms.iter().fold((0.0, 0.0), |(q, c), room| {
            (q + room.quality_score, c + f32::from(room.complexity.get()))
        });

        PoolStats {
            count,
            average_quality: quality / count as f32,
            average_complexity: complexity / count as f32,
        }
    }
}
