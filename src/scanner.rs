use std::ops::Range;
use tracing::trace;

use crate::aggregator::MatchAggregator;
use crate::reference_index::ReferenceIndex;
use crate::report::MatchRecord;
use crate::rolling_hash::window_hash;
use crate::tokenizer::WordSequence;

/// Partition-local counters. Only used for logging; the report is always derived
/// from the aggregator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub offsets_probed: usize,
    pub hash_collisions: usize,
    pub claims_won: usize,
    pub claims_lost: usize,
}

/// Scans start offsets of the source document against the reference index.
///
/// Everything it reads is shared read-only; the only shared writes go through the
/// aggregator's `claim` and `record`.
pub struct PartitionScanner<'a> {
    source: &'a WordSequence,
    reference: &'a WordSequence,
    index: &'a ReferenceIndex,
    aggregator: &'a MatchAggregator,
}

impl<'a> PartitionScanner<'a> {
    pub fn new(
        source: &'a WordSequence,
        reference: &'a WordSequence,
        index: &'a ReferenceIndex,
        aggregator: &'a MatchAggregator,
    ) -> Self {
        debug_assert_eq!(source.len(), aggregator.len());
        Self {
            source,
            reference,
            index,
            aggregator,
        }
    }

    /// Process the start offsets in `range`.
    ///
    /// Offsets with fewer than a window of words ahead are never starts. A fragment
    /// found here may extend past `range.end`; the cursor then jumps past it.
    pub fn scan(&self, range: Range<usize>) -> ScanStats {
        let window = self.index.window();
        let mut stats = ScanStats::default();

        if self.source.len() < window || self.index.is_empty() {
            return stats;
        }

        let last_start = self.source.len() - window;
        let end = range.end.min(last_start + 1);
        let mut cursor = range.start;

        while cursor < end {
            if self.aggregator.is_covered(cursor) {
                cursor += 1;
                continue;
            }
            stats.offsets_probed += 1;
            match self.match_at(cursor, &mut stats) {
                Some(length) => cursor += length,
                None => cursor += 1,
            }
        }

        stats
    }

    /// Try to accept a fragment starting at source offset `start`.
    /// Returns its length when one was claimed.
    fn match_at(&self, start: usize, stats: &mut ScanStats) -> Option<usize> {
        let window = self.index.window();
        let probe = self.source.window(start, window);

        for &candidate in self.index.candidates(window_hash(self.source, start, window)) {
            if self.reference.window(candidate, window) != probe {
                stats.hash_collisions += 1;
                continue;
            }

            let extended = self.extend(start, candidate, window);
            if let Some(length) = self.claim(start, extended, stats) {
                let text = self.source.group(start, length);
                trace!(start, length, reference_start = candidate, "fragment");
                self.aggregator.record(MatchRecord {
                    start,
                    length,
                    reference_start: candidate,
                    text,
                });
                return Some(length);
            }
        }

        None
    }

    /// Length of the longest common run at (`start`, `candidate`), given that the
    /// first `verified` words already match.
    fn extend(&self, start: usize, candidate: usize, verified: usize) -> usize {
        let source = self.source.as_slice();
        let reference = self.reference.as_slice();
        let mut length = verified;
        while start + length < source.len()
            && candidate + length < reference.len()
            && source[start + length] == reference[candidate + length]
        {
            length += 1;
        }
        length
    }

    /// Claim `[start, start + length)`. If another worker covered part of it first,
    /// cut the run at the first covered word and retry while it still spans a window.
    fn claim(&self, start: usize, mut length: usize, stats: &mut ScanStats) -> Option<usize> {
        let window = self.index.window();
        loop {
            if let Some(covered) = self.aggregator.first_covered(start..start + length) {
                length = covered - start;
            }
            if length < window {
                return None;
            }
            if self.aggregator.claim(start..start + length) {
                stats.claims_won += 1;
                return Some(length);
            }
            stats.claims_lost += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn scan_all(source: &str, reference: &str, window: usize) -> (Vec<MatchRecord>, ScanStats) {
        let source = tokenize(source);
        let reference = tokenize(reference);
        let index = ReferenceIndex::build(&reference, window);
        let aggregator = MatchAggregator::new(source.len());
        let stats = PartitionScanner::new(&source, &reference, &index, &aggregator)
            .scan(0..source.len());
        (aggregator.finish().matches, stats)
    }

    #[test]
    fn test_finds_and_extends() {
        let (matches, stats) = scan_all(
            "the cat sat on the mat today",
            "the cat sat on the mat yesterday",
            4,
        );
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].start, 0);
        assert_eq!(matches[0].length, 6);
        assert_eq!(matches[0].text, "the cat sat on the mat");
        assert_eq!(stats.claims_won, 1);
        assert_eq!(stats.claims_lost, 0);
    }

    #[test]
    fn test_earliest_reference_occurrence_wins() {
        let (matches, _) = scan_all("a b c d", "a b c d x a b c d e", 4);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].reference_start, 0);
    }

    #[test]
    fn test_match_at_last_window() {
        let (matches, _) = scan_all("x y z one two three four", "one two three four", 4);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].start, 3);
        assert_eq!(matches[0].text, "one two three four");
    }

    #[test]
    fn test_case_sensitive() {
        let (matches, _) = scan_all("The Cat Sat On", "the cat sat on", 4);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_cursor_skips_covered_words() {
        // second copy of the phrase in the source is a separate fragment
        let (matches, _) = scan_all("a b c d e a b c d e", "a b c d e", 4);
        let spans: Vec<(usize, usize)> = matches.iter().map(|m| (m.start, m.length)).collect();
        assert_eq!(spans, vec![(0, 5), (5, 5)]);
    }

    #[test]
    fn test_range_end_does_not_truncate_fragment() {
        let source = tokenize("p q r s t u v w");
        let reference = tokenize("p q r s t u v w");
        let index = ReferenceIndex::build(&reference, 4);
        let aggregator = MatchAggregator::new(source.len());
        let scanner = PartitionScanner::new(&source, &reference, &index, &aggregator);

        scanner.scan(0..2);
        // the neighbouring partition finds everything already covered
        let stats = scanner.scan(2..8);
        assert_eq!(stats.offsets_probed, 0);

        let state = aggregator.finish();
        assert_eq!(state.matches.len(), 1);
        assert_eq!(state.matches[0].length, 8);
        assert_eq!(state.covered, 8);
    }

    #[test]
    fn test_lost_claim_is_clipped() {
        let source = tokenize("a b c d e f g h i j");
        let reference = tokenize("a b c d e f g h i j");
        let index = ReferenceIndex::build(&reference, 4);
        let aggregator = MatchAggregator::new(source.len());
        // another worker already owns the tail
        assert!(aggregator.claim(6..10));

        let stats = PartitionScanner::new(&source, &reference, &index, &aggregator).scan(0..6);
        let state = aggregator.finish();
        assert_eq!(stats.claims_won, 1);
        assert_eq!(state.matches[0].start, 0);
        assert_eq!(state.matches[0].length, 6);
        assert_eq!(state.covered, 10);
    }

    #[test]
    fn test_clipped_below_window_is_dropped() {
        let source = tokenize("a b c d e f");
        let reference = tokenize("a b c d e f");
        let index = ReferenceIndex::build(&reference, 4);
        let aggregator = MatchAggregator::new(source.len());
        assert!(aggregator.claim(3..6));

        PartitionScanner::new(&source, &reference, &index, &aggregator).scan(0..3);
        let state = aggregator.finish();
        assert!(state.matches.is_empty());
        assert_eq!(state.covered, 3);
    }
}
