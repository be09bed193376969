use thiserror::Error;

/// Errors surfaced by backend operations.
///
/// Empty result sets are never errors: reads substitute defaults or empty
/// collections instead.
#[derive(Debug, Error)]
pub enum Error {
    /// A mutation that needs a caller identity was invoked anonymously
    #[error("Must be logged in to save results")]
    Unauthenticated,

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid seed passage data: {0}")]
    SeedData(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
