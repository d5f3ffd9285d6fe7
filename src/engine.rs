use std::ops::Range;
use std::sync::Mutex;
use tracing::{debug, info};

use crate::aggregator::MatchAggregator;
use crate::config::DetectConfig;
use crate::error::DetectResult;
use crate::reference_index::ReferenceIndex;
use crate::report::{plagiarism_percentage, DetectionReport};
use crate::scanner::{PartitionScanner, ScanStats};
use crate::tokenizer::{tokenize, WordSequence};

/// Split `0..len` into at most `workers` contiguous slices of near-equal size, none
/// shorter than `min_len` unless `len` itself is. The last slice absorbs the remainder.
pub fn partition(len: usize, workers: usize, min_len: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }
    let workers = workers.clamp(1, (len / min_len.max(1)).max(1));
    let part = len / workers;

    (0..workers)
        .map(|i| {
            let start = i * part;
            let end = if i == workers - 1 { len } else { start + part };
            start..end
        })
        .collect()
}

/// Runs the full comparison of a source document against a reference document.
#[derive(Debug, Clone, Default)]
pub struct Detector {
    config: DetectConfig,
}

impl Detector {
    pub fn new(config: DetectConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectConfig {
        &self.config
    }

    /// Tokenize both texts, then [`Detector::detect`].
    pub fn detect_texts(&self, source: &str, reference: &str) -> DetectResult<DetectionReport> {
        let source = tokenize(source);
        let reference = tokenize(reference);
        self.detect(&source, &reference)
    }

    /// Find fragments of `source` that also occur in `reference`.
    ///
    /// Either document being shorter than the window gives an empty report. Otherwise
    /// the source start offsets are split across a dedicated worker pool and the call
    /// blocks until every partition has been scanned.
    pub fn detect(
        &self,
        source: &WordSequence,
        reference: &WordSequence,
    ) -> DetectResult<DetectionReport> {
        let window = self.config.window();
        let total_words = source.len();

        if source.len() < window || reference.len() < window {
            debug!(
                source_words = source.len(),
                reference_words = reference.len(),
                window,
                "document shorter than window, nothing to match"
            );
            return Ok(DetectionReport::empty(total_words));
        }

        let index = ReferenceIndex::build(reference, window);
        debug!(
            offsets = index.len(),
            buckets = index.bucket_count(),
            "reference index built"
        );

        let starts = source.len() - window + 1;
        let partitions = partition(
            starts,
            self.config.worker_count.get(),
            self.config.min_partition_len.get(),
        );

        let aggregator = MatchAggregator::new(source.len());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(partitions.len())
            .thread_name(|i| format!("plagscan-worker-{i}"))
            .build()?;

        let totals = Mutex::new(ScanStats::default());
        {
            let scanner = PartitionScanner::new(source, reference, &index, &aggregator);
            let scanner = &scanner;
            let totals = &totals;
            pool.scope(|s| {
                for (worker, range) in partitions.iter().cloned().enumerate() {
                    s.spawn(move |_| {
                        let stats = scanner.scan(range.clone());
                        debug!(
                            worker,
                            start = range.start,
                            end = range.end,
                            claims_won = stats.claims_won,
                            claims_lost = stats.claims_lost,
                            collisions = stats.hash_collisions,
                            "partition scanned"
                        );
                        if let Ok(mut totals) = totals.lock() {
                            totals.offsets_probed += stats.offsets_probed;
                            totals.hash_collisions += stats.hash_collisions;
                            totals.claims_won += stats.claims_won;
                            totals.claims_lost += stats.claims_lost;
                        }
                    });
                }
            });
        }

        let state = aggregator.finish();
        let percentage = plagiarism_percentage(state.covered, total_words);
        let totals = totals.into_inner().unwrap_or_default();
        info!(
            workers = partitions.len(),
            total_words,
            plagiarized_words = state.covered,
            fragments = state.matches.len(),
            probed = totals.offsets_probed,
            collisions = totals.hash_collisions,
            lost_claims = totals.claims_lost,
            "detection complete: {percentage:.2}%"
        );

        Ok(DetectionReport {
            total_words,
            plagiarized_words: state.covered,
            percentage,
            histogram: state.histogram,
            matches: state.matches,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_even_split() {
        assert_eq!(partition(8, 4, 1), vec![0..2, 2..4, 4..6, 6..8]);
    }

    #[test]
    fn test_partition_last_absorbs_remainder() {
        assert_eq!(partition(10, 4, 1), vec![0..2, 2..4, 4..6, 6..10]);
    }

    #[test]
    fn test_partition_respects_min_len() {
        assert_eq!(partition(4, 4, 64), vec![0..4]);
        assert_eq!(partition(130, 4, 64), vec![0..65, 65..130]);
    }

    #[test]
    fn test_partition_covers_everything_once() {
        for len in [1, 3, 7, 64, 257, 1000] {
            for workers in 1..=6 {
                let parts = partition(len, workers, 1);
                assert!(parts.len() <= workers);
                assert_eq!(parts.first().map(|r| r.start), Some(0));
                assert_eq!(parts.last().map(|r| r.end), Some(len));
                assert!(parts.windows(2).all(|w| w[0].end == w[1].start));
                assert!(parts.iter().all(|r| !r.is_empty()));
            }
        }
        assert!(partition(0, 4, 1).is_empty());
    }

    #[test]
    fn test_cat_on_mat_scenario() {
        let report = Detector::default()
            .detect_texts("the cat sat on the mat today", "the cat sat on the mat yesterday")
            .unwrap();
        assert_eq!(report.total_words, 7);
        assert_eq!(report.plagiarized_words, 6);
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].text, "the cat sat on the mat");
        assert_eq!(report.histogram.get(&6), Some(&1));
        assert!((report.percentage - 6.0 / 7.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_documents_give_empty_report() {
        let detector = Detector::default();
        let report = detector.detect_texts("a b c", "a b c").unwrap();
        assert_eq!(report, DetectionReport::empty(3));

        let report = detector.detect_texts("a b c d e", "a b c").unwrap();
        assert_eq!(report.percentage, 0.0);
        assert!(report.histogram.is_empty());
        assert!(report.matches.is_empty());
    }

    #[test]
    fn test_empty_source() {
        let report = Detector::default().detect_texts("", "a b c d").unwrap();
        assert_eq!(report.total_words, 0);
        assert_eq!(report.percentage, 0.0);
    }
}
