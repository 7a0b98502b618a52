use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while verifying concept mappings.
#[derive(Debug, Error)]
pub enum Error {
    /// A lookup expected at least one parameter with this name and kind.
    #[error("Parameter not found: {name} ({tag})")]
    ParameterNotFound { name: String, tag: &'static str },

    /// A parameter carries the right tag but its value has the wrong shape.
    #[error("Invalid {tag} in parameter '{name}': {reason}")]
    InvalidParameterValue {
        name: String,
        tag: &'static str,
        reason: String,
    },

    /// The server answered with something other than a Parameters resource.
    #[error("Expected a Parameters resource, got {0}")]
    UnexpectedResource(String),

    /// Non-success HTTP status from the terminology server.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        status: reqwest::StatusCode,
        url: String,
        message: String,
    },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse response JSON from {url}: {source}")]
    InvalidJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The input CSV does not start with `source_code,target_code`.
    #[error("Invalid header row: expected source_code,target_code, found {}", .found.join(","))]
    InvalidHeader { found: Vec<String> },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn parameter_not_found(name: impl Into<String>, tag: &'static str) -> Self {
        Self::ParameterNotFound {
            name: name.into(),
            tag,
        }
    }

    pub fn invalid_parameter_value(
        name: impl Into<String>,
        tag: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameterValue {
            name: name.into(),
            tag,
            reason: reason.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
