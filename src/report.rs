use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One accepted fragment: document-1 words `[start, start + length)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub start: usize,
    pub length: usize,
    /// Start offset of the verified occurrence in the reference document.
    pub reference_start: usize,
    pub text: String,
}

impl MatchRecord {
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Result of comparing a source document against a reference document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub total_words: usize,
    pub plagiarized_words: usize,
    pub percentage: f64,
    /// Fragment length in words -> number of fragments of that length.
    pub histogram: BTreeMap<usize, usize>,
    /// Sorted by `start`.
    pub matches: Vec<MatchRecord>,
}

impl DetectionReport {
    /// Report for a run in which nothing could match.
    pub fn empty(total_words: usize) -> Self {
        Self {
            total_words,
            plagiarized_words: 0,
            percentage: 0.0,
            histogram: BTreeMap::new(),
            matches: Vec::new(),
        }
    }
}

pub fn plagiarism_percentage(plagiarized_words: usize, total_words: usize) -> f64 {
    if total_words == 0 {
        return 0.0;
    }
    plagiarized_words as f64 / total_words as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert_eq!(plagiarism_percentage(0, 0), 0.0);
        assert_eq!(plagiarism_percentage(5, 10), 50.0);
        assert!((plagiarism_percentage(6, 7) - 85.714_285).abs() < 1e-4);
    }

    #[test]
    fn test_report_serializes() {
        let mut report = DetectionReport::empty(7);
        report.plagiarized_words = 6;
        report.percentage = plagiarism_percentage(6, 7);
        report.histogram.insert(6, 1);
        report.matches.push(MatchRecord {
            start: 0,
            length: 6,
            reference_start: 0,
            text: "the cat sat on the mat".to_string(),
        });

        let json = serde_json::to_string(&report).unwrap();
        let back: DetectionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
        assert!(json.contains("\"histogram\":{\"6\":1}"));
    }
}
