//! Labelled seed derivation so every random stream replays from one session seed.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Stream driving theme, puzzle count and category draws of one room.
pub const STREAM_GENERATION: &str = "generation";
/// Stream driving overlap perturbation during validation.
pub const STREAM_OVERLAP: &str = "overlap";

/// Derives the base seed for the `job`-th generation of a session.
#[must_use]
pub fn derive_job_seed(session_seed: u64, job: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(session_seed.to_le_bytes());
    hasher.update(job.to_le_bytes());
    finalize_seed(hasher)
}

/// Derives an independent seed for a named stream.
#[must_use]
pub fn derive_labeled_seed(base: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    finalize_seed(hasher)
}

/// Random generator for a named stream of `base`.
#[must_use]
pub fn labeled_rng(base: u64, label: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_labeled_seed(base, label))
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::{derive_job_seed, derive_labeled_seed, labeled_rng, STREAM_GENERATION, STREAM_OVERLAP};
    use rand::RngCore;

    #[test]
    fn derivation_is_stable_and_label_sensitive() {
        let base = derive_job_seed(42, 3);
        assert_eq!(base, derive_job_seed(42, 3));
        assert_ne!(base, derive_job_seed(42, 4));
        assert_ne!(
            derive_labeled_seed(base, STREAM_GENERATION),
            derive_labeled_seed(base, STREAM_OVERLAP)
        );
    }

    #[test]
    fn labeled_streams_replay() {
        let mut first = labeled_rng(7, STREAM_OVERLAP);
        let mut second = labeled_rng(7, STREAM_OVERLAP);
        for _ in 0..16 {
            assert_eq!(first.next_u64(), second.next_u64());
        }
    }
}
