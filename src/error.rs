use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForecastError>;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// No scorer is loaded or the remote scorer could not be reached.
    /// Callers must refuse to answer instead of inventing a number.
    #[error("scorer unavailable: {0}")]
    ScorerUnavailable(String),

    #[error("scorer error: {0}")]
    Scorer(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ForecastError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ForecastError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(what: impl Into<String>, err: impl std::fmt::Display) -> Self {
        ForecastError::Parse {
            what: what.into(),
            message: err.to_string(),
        }
    }
}
