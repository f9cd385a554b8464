//! Error types for the filepulse pipeline.

/// Top-level error type for the tracking and scheduling system.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    /// User-supplied input that cannot be interpreted (bad id, bad URL, bad time).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A referenced entry does not exist (untracked file, unconfigured time).
    #[error("not found: {0}")]
    NotFound(String),

    /// Stats endpoint request or response error.
    #[error("provider error: {0}")]
    Provider(String),

    /// Webhook delivery error for a single target.
    #[error("dispatch error: {0}")]
    Dispatch(String),

    /// Tracked-data or settings store error (read, parse, write).
    #[error("store error: {0}")]
    Store(String),

    /// Schedule descriptor or job control error.
    #[error("schedule error: {0}")]
    Schedule(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, TrackError>;
