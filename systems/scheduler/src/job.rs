use std::time::Duration;

use puzzle_director_core::{GeneratedRoom, GenerationStage};
use puzzle_director_system_content_generation::{seeds, RoomBlueprint};
use rand_chacha::ChaCha8Rng;

use crate::CancellationToken;

/// Work carried from one stage to the next.
#[derive(Debug)]
pub(crate) enum JobState {
    Structure,
    Puzzles(RoomBlueprint),
    Validation(GeneratedRoom),
    Commit(GeneratedRoom),
}

impl JobState {
    pub(crate) const fn stage(&self) -> GenerationStage {
        match self {
            Self::Structure => GenerationStage::Structure,
            Self::Puzzles(_) => GenerationStage::Puzzles,
            Self::Validation(_) => GenerationStage::Validation,
            Self::Commit(_) => GenerationStage::Commit,
        }
    }
}

/// In-flight room generation, advanced one stage per scheduler tick.
#[derive(Debug)]
pub(crate) struct GenerationJob {
    pub(crate) state: JobState,
    /// Execution time spent in completed stages.
    pub(crate) busy: Duration,
    pub(crate) token: CancellationToken,
    pub(crate) generation_rng: ChaCha8Rng,
    pub(crate) overlap_rng: ChaCha8Rng,
}

impl GenerationJob {
    pub(crate) fn new(session_seed: u64, index: u64) -> Self {
        let base = seeds::derive_job_seed(session_seed, index);
        Self {
            state: JobState::Structure,
            busy: Duration::ZERO,
            token: CancellationToken::new(),
            generation_rng: seeds::labeled_rng(base, seeds::STREAM_GENERATION),
            overlap_rng: seeds::labeled_rng(base, seeds::STREAM_OVERLAP),
        }
    }

    pub(crate) const fn stage(&self) -> GenerationStage {
        self.state.stage()
    }
}
