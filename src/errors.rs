use thiserror::Error;

/// Error produced when an engine is misconfigured or the heap API is misused.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Heuristic multiplier must be at least 1, got {0}")]
    InvalidMultiplier(f64),

    #[error("Worker count must be at least 1")]
    InvalidWorkerCount,

    #[error("Heap keys must not be NaN")]
    NanKey,

    #[error("Cannot raise a key from {current} to {requested}")]
    KeyIncrease { current: f64, requested: f64 },

    #[error("Heap handle is stale or refers to an extracted entry")]
    StaleHandle,
}

/// Result when a search method might fail.
pub type Result<T> = std::result::Result<T, SearchError>;
