//! Error types for shade-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in shade-core
#[derive(Debug, Error)]
pub enum Error {
    /// Manifest content is not a sequence of `Name: Value` headers
    #[error("malformed manifest '{source_name}' at line {line}: {message}")]
    MalformedManifest {
        source_name: String,
        line: usize,
        message: String,
    },

    /// Attribute name violates the manifest header-name rules
    #[error("invalid attribute name '{0}'")]
    InvalidAttributeName(String),

    /// Attribute value would span more than one line
    #[error("invalid value for attribute '{name}': line breaks are not allowed")]
    InvalidAttributeValue { name: String, value: String },

    /// Attribute assignment not in `NAME=VALUE` form
    #[error("invalid attribute assignment '{0}', expected NAME=VALUE")]
    InvalidAssignment(String),

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn malformed(source_name: &str, line: usize, message: impl Into<String>) -> Self {
        Error::MalformedManifest {
            source_name: source_name.to_string(),
            line,
            message: message.into(),
        }
    }
}
