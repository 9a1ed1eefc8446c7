//! Error types for fddmap.
//!
//! Only structural problems surface here. Data-quality problems in a
//! document (bad coordinates, no headers, conflicting numbering) degrade to
//! defaults, MISSING results or validation issues instead.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FddError {
    /// The input is not a usable document at all (not an object, `texts` not a list, ...).
    #[error("invalid document: {message}")]
    InvalidDocument { message: String },

    /// A numbering-scheme regex failed to compile.
    #[error("invalid numbering pattern '{name}': {source}")]
    InvalidPattern {
        name: String,
        source: regex::Error,
    },

    /// Configuration values out of range or inconsistent.
    #[error("config error: {message}")]
    InvalidConfig { message: String },

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, FddError>;

impl FddError {
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: msg.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by the input document rather than by setup.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidDocument { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = FddError::invalid_document("`texts` is not an array");
        assert_eq!(err.to_string(), "invalid document: `texts` is not an array");
        assert!(err.is_input_error());

        let err = FddError::config("threshold must be within 0..=100");
        assert!(err.to_string().starts_with("config error"));
        assert!(!err.is_input_error());
    }
}
