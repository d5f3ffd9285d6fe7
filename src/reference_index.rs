use std::collections::HashMap;

use crate::rolling_hash::window_hash;
use crate::tokenizer::WordSequence;

/// Window hash -> ascending start offsets in the reference document.
///
/// Built once per run, then shared read-only by every scanner.
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    window: usize,
    buckets: HashMap<u32, Vec<usize>>,
    offsets: usize,
}

impl ReferenceIndex {
    /// Hash every `window`-word group of `words`.
    ///
    /// A document shorter than the window yields an empty index. Offsets are pushed in
    /// increasing order, so each bucket lists the earliest occurrence first.
    pub fn build(words: &WordSequence, window: usize) -> Self {
        assert!(window > 0, "window size must be at least one word");

        if words.len() < window {
            return Self {
                window,
                buckets: HashMap::new(),
                offsets: 0,
            };
        }

        let offsets = words.len() - window + 1;
        let mut buckets: HashMap<u32, Vec<usize>> = HashMap::new();
        for start in 0..offsets {
            buckets
                .entry(window_hash(words, start, window))
                .or_default()
                .push(start);
        }

        Self {
            window,
            buckets,
            offsets,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Candidate start offsets for `hash`, earliest first. Empty on a miss.
    pub fn candidates(&self, hash: u32) -> &[usize] {
        self.buckets.get(&hash).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of indexed offsets.
    pub fn len(&self) -> usize {
        self.offsets
    }

    pub fn is_empty(&self) -> bool {
        self.offsets == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}
