use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

use crate::error::{DetectError, DetectResult};

pub const DEFAULT_MIN_WORDS: usize = 4;
pub const DEFAULT_WORKER_COUNT: usize = 4;
pub const DEFAULT_MIN_PARTITION_LEN: usize = 64;

/// Engine settings.
///
/// Zero values cannot be represented once a `DetectConfig` exists; `DetectConfig::new`
/// rejects them up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectConfig {
    /// Shortest word run reported as a fragment, and the hashed window size.
    pub min_words: NonZeroUsize,
    /// Upper bound on concurrently scanned partitions.
    pub worker_count: NonZeroUsize,
    /// Partitions never hold fewer start offsets than this; short documents
    /// therefore run on fewer workers.
    pub min_partition_len: NonZeroUsize,
}

fn non_zero(value: usize, name: &str) -> DetectResult<NonZeroUsize> {
    NonZeroUsize::new(value)
        .ok_or_else(|| DetectError::InvalidConfig(format!("{name} must be at least 1")))
}

impl DetectConfig {
    pub fn new(min_words: usize, worker_count: usize) -> DetectResult<Self> {
        Ok(Self {
            min_words: non_zero(min_words, "min_words")?,
            worker_count: non_zero(worker_count, "worker_count")?,
            ..Self::default()
        })
    }

    pub fn with_min_partition_len(mut self, len: usize) -> DetectResult<Self> {
        self.min_partition_len = non_zero(len, "min_partition_len")?;
        Ok(self)
    }

    pub fn window(&self) -> usize {
        self.min_words.get()
    }
}

const fn default_non_zero(value: usize) -> NonZeroUsize {
    match NonZeroUsize::new(value) {
        Some(n) => n,
        None => panic!("default must be non-zero"),
    }
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            min_words: const { default_non_zero(DEFAULT_MIN_WORDS) },
            worker_count: const { default_non_zero(DEFAULT_WORKER_COUNT) },
            min_partition_len: const { default_non_zero(DEFAULT_MIN_PARTITION_LEN) },
        }
    }
}
