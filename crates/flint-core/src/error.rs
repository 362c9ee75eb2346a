//! Error types for Flint

use crate::types::ResourceKind;
use std::path::PathBuf;
use thiserror::Error;

/// Broad classification of a [`FlintError`], so callers can tell
/// "forgot metadata" apart from "wrong file type" without matching every variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bad input before any parsing (empty identifier, bad config)
    Argument,
    /// Wrong extension or path form for the requested kind
    Shape,
    /// Missing or malformed construction parameter
    Metadata,
    /// Identifier is well-formed but the file is absent
    NotFound,
    /// Raised while building the resource itself
    Construction,
    /// The cache has been shut down
    Lifecycle,
}

/// The main error type for Flint operations
#[derive(Debug, Error)]
pub enum FlintError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid content identifier '{identifier}': {reason}")]
    InvalidShape { identifier: String, reason: String },

    #[error("Missing metadata in '{identifier}': expected {expected}")]
    MissingMetadata { identifier: String, expected: String },

    #[error("Malformed metadata '{parameter}' in '{identifier}': expected {expected}")]
    MalformedMetadata {
        identifier: String,
        parameter: String,
        expected: String,
    },

    #[error("Content not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported format for '{}': supported extensions are {}", .path.display(), .supported.join(", "))]
    UnsupportedFormat {
        path: PathBuf,
        supported: Vec<String>,
    },

    #[error("Construction failed: {0}")]
    ConstructionFailed(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{0} cache has been shut down")]
    CacheShutDown(ResourceKind),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),
}

impl FlintError {
    /// Classify this error for caller diagnostics
    pub fn category(&self) -> ErrorCategory {
        match self {
            FlintError::InvalidArgument(_)
            | FlintError::ConfigError(_)
            | FlintError::TomlParseError(_)
            | FlintError::TomlSerError(_) => ErrorCategory::Argument,
            FlintError::InvalidShape { .. } => ErrorCategory::Shape,
            FlintError::MissingMetadata { .. } | FlintError::MalformedMetadata { .. } => {
                ErrorCategory::Metadata
            }
            FlintError::NotFound(_) => ErrorCategory::NotFound,
            FlintError::UnsupportedFormat { .. }
            | FlintError::ConstructionFailed(_)
            | FlintError::ImageError(_)
            | FlintError::IoError(_) => ErrorCategory::Construction,
            FlintError::CacheShutDown(_) => ErrorCategory::Lifecycle,
        }
    }
}

/// Result type alias for Flint operations
pub type Result<T> = std::result::Result<T, FlintError>;

impl From<toml::de::Error> for FlintError {
    fn from(err: toml::de::Error) -> Self {
        FlintError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for FlintError {
    fn from(err: toml::ser::Error) -> Self {
        FlintError::TomlSerError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_errors_share_category() {
        let missing = FlintError::MissingMetadata {
            identifier: "arial.ttf".into(),
            expected: "size:<n>".into(),
        };
        let malformed = FlintError::MalformedMetadata {
            identifier: "arial.ttf|size:big".into(),
            parameter: "size:big".into(),
            expected: "size:<n>".into(),
        };
        assert_eq!(missing.category(), ErrorCategory::Metadata);
        assert_eq!(malformed.category(), ErrorCategory::Metadata);
    }

    #[test]
    fn test_unsupported_format_lists_extensions() {
        let err = FlintError::UnsupportedFormat {
            path: PathBuf::from("clip.wav"),
            supported: vec![".ogg".into(), ".mp3".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains(".ogg, .mp3"));
        assert_eq!(err.category(), ErrorCategory::Construction);
    }

    #[test]
    fn test_toml_error_conversion() {
        let err: FlintError = toml::from_str::<toml::Value>("= broken").unwrap_err().into();
        assert!(matches!(err, FlintError::TomlParseError(_)));
    }
}
