//! Error types.

/// Errors raised while loading settings or setting up a scenario.
///
/// The decision routines themselves never fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Settings could not be parsed, or a report could not be written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// A settings file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
