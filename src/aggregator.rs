use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::report::MatchRecord;

#[derive(Debug, Default)]
struct Ledger {
    matches: Vec<MatchRecord>,
    histogram: BTreeMap<usize, usize>,
}

/// Shared state written by every partition scanner.
///
/// Coverage marks are atomics so the per-offset "already covered?" probe never takes a
/// lock. Setting marks is serialised by `claim_lock`, which makes a range claim a
/// single all-or-nothing decision. Records and the histogram live together behind the
/// ledger lock so a record never lands without its histogram increment.
#[derive(Debug)]
pub struct MatchAggregator {
    marks: Vec<AtomicBool>,
    claim_lock: Mutex<()>,
    ledger: Mutex<Ledger>,
}

/// Final state once every scanner has joined.
#[derive(Debug)]
pub struct AggregateState {
    pub matches: Vec<MatchRecord>,
    pub histogram: BTreeMap<usize, usize>,
    pub covered: usize,
}

// Neither lock guards a multi-step invariant that a panicking holder could leave
// half-done, so a poisoned lock is still safe to use.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MatchAggregator {
    /// One unset mark per source word.
    pub fn new(words: usize) -> Self {
        Self {
            marks: (0..words).map(|_| AtomicBool::new(false)).collect(),
            claim_lock: Mutex::new(()),
            ledger: Mutex::new(Ledger::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn is_covered(&self, idx: usize) -> bool {
        self.marks[idx].load(Ordering::Acquire)
    }

    /// First covered index in `range`, if any.
    pub fn first_covered(&self, mut range: Range<usize>) -> Option<usize> {
        range.find(|&idx| self.is_covered(idx))
    }

    /// Mark every index of `range` as covered, but only if none of them already is.
    ///
    /// Returns whether the claim was taken. Marks are never cleared.
    pub fn claim(&self, range: Range<usize>) -> bool {
        assert!(
            range.start < range.end && range.end <= self.marks.len(),
            "claim {range:?} out of bounds for {} words",
            self.marks.len()
        );

        let _guard = lock(&self.claim_lock);
        if self.marks[range.clone()]
            .iter()
            .any(|mark| mark.load(Ordering::Acquire))
        {
            return false;
        }
        for mark in &self.marks[range] {
            mark.store(true, Ordering::Release);
        }
        true
    }

    /// Append a fragment and count its length in the histogram.
    pub fn record(&self, record: MatchRecord) {
        let mut ledger = lock(&self.ledger);
        *ledger.histogram.entry(record.length).or_insert(0) += 1;
        ledger.matches.push(record);
    }

    pub fn covered_count(&self) -> usize {
        self.marks
            .iter()
            .filter(|mark| mark.load(Ordering::Acquire))
            .count()
    }

    /// Consume the aggregator; matches come back sorted by start offset.
    pub fn finish(self) -> AggregateState {
        let covered = self.covered_count();
        let Ledger {
            mut matches,
            histogram,
        } = self.ledger.into_inner().unwrap_or_else(PoisonError::into_inner);
        matches.sort_by_key(|m| m.start);

        AggregateState {
            matches,
            histogram,
            covered,
        }
    }
}
