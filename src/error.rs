//! Error types for the portfolio environment.

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Episode parameters are out of range for the supplied frame
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The price/sentiment data could not be aligned into a usable frame
    #[error("Data alignment error: {0}")]
    DataAlignment(String),

    /// The environment was driven out of order (step before reset, step after done)
    #[error("Invalid call: {0}")]
    InvalidCall(String),

    /// The action vector does not fit the environment
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// A field in an input file could not be parsed
    #[error("Failed to parse data: {0}")]
    Parse(String),

    /// CSV reader/writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error comes from building an environment (bad parameters or data)
    /// rather than from driving one.
    pub fn is_construction_error(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::DataAlignment(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Configuration("window_size must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: window_size must be positive"
        );
    }

    #[test]
    fn test_construction_classification() {
        assert!(Error::DataAlignment("empty".into()).is_construction_error());
        assert!(!Error::InvalidCall("done".into()).is_construction_error());
    }
}
