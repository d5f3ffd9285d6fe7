use thiserror::Error;

pub type DetectResult<T> = Result<T, DetectError>;

/// Errors surfaced by the detection engine.
///
/// Short documents are not an error: they produce an empty report.
#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
