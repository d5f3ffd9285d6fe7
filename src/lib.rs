//! Word-level plagiarism detection.
//!
//! A source document is compared against a reference document by hashing every
//! `min_words`-word window of the reference, probing those windows from the source in
//! parallel partitions, verifying candidates word by word and greedily extending them.
//! Each source word is credited to at most one fragment.
//!
//! ```
//! use plagscan::{DetectConfig, Detector};
//!
//! let detector = Detector::new(DetectConfig::new(4, 4)?);
//! let report = detector.detect_texts(
//!     "the cat sat on the mat today",
//!     "the cat sat on the mat yesterday",
//! )?;
//! assert_eq!(report.matches[0].text, "the cat sat on the mat");
//! assert_eq!(report.plagiarized_words, 6);
//! # Ok::<(), plagscan::DetectError>(())
//! ```

pub mod aggregator;
pub mod config;
pub mod engine;
pub mod error;
pub mod reference_index;
pub mod report;
pub mod rolling_hash;
pub mod scanner;
pub mod tokenizer;
pub mod util;

pub use config::DetectConfig;
pub use engine::Detector;
pub use error::{DetectError, DetectResult};
pub use report::{DetectionReport, MatchRecord};
pub use tokenizer::{tokenize, WordSequence};
