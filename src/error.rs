//! Error types for the elltwo library
//!
//! This module provides centralized error handling using `thiserror` across all components

use std::path::PathBuf;
use thiserror::Error;

/// Parse-related errors
#[derive(Debug, Clone, PartialEq, Eq, Error, uniffi::Error)]
pub enum ParseError {
    /// No inline rule could consume input at the given byte offset
    #[error("Inline scanner stuck at offset {offset} (byte 0x{byte:02x})")]
    Stuck { offset: u64, byte: u8 },

    /// Other parsing errors
    #[error("Parse error: {0}")]
    Other(String),
}

impl ParseError {
    /// Create a stuck-scanner error at `offset`, recording the byte found there
    pub fn stuck(offset: usize, byte: Option<u8>) -> Self {
        Self::Stuck {
            offset: offset as u64,
            byte: byte.unwrap_or(0),
        }
    }

    /// Create a generic parse error
    pub fn other(reason: impl Into<String>) -> Self {
        Self::Other(reason.into())
    }
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Rendering errors
#[derive(Debug, Clone, Error, uniffi::Error)]
pub enum RenderError {
    /// A graphics collaborator rejected the figure code
    #[error("Graphics rendering failed: {0}")]
    Graphics(String),

    /// Referenced upload was not found
    #[error("Upload not found: {0}")]
    MissingUpload(String),

    /// General render error
    #[error("Render error: {0}")]
    Other(String),
}

impl RenderError {
    /// Create a graphics failure error
    pub fn graphics(reason: impl Into<String>) -> Self {
        Self::Graphics(reason.into())
    }

    /// Create a missing upload error
    pub fn missing_upload(key: impl Into<String>) -> Self {
        Self::MissingUpload(key.into())
    }

    /// Create a generic render error
    pub fn other(reason: impl Into<String>) -> Self {
        Self::Other(reason.into())
    }
}

/// Result type for render operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Renderer configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParseError(#[from] toml::de::Error),
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Serialization-related errors
#[derive(Debug, Error, uniffi::Error)]
pub enum SerializationError {
    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Serialization failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),
}

impl SerializationError {
    /// Create an unsupported format error
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat(format.into())
    }

    /// Create a serialization failed error
    pub fn serialization_failed(reason: impl Into<String>) -> Self {
        Self::SerializationFailed(reason.into())
    }

    /// Create a deserialization failed error
    pub fn deserialization_failed(reason: impl Into<String>) -> Self {
        Self::DeserializationFailed(reason.into())
    }
}

/// Result type for serialization operations
pub type SerializationResult<T> = Result<T, SerializationError>;

/// Main unified error type that can represent any elltwo error
#[derive(Debug, Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum ElltwoError {
    /// Parsing error
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Render error
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Serialization error
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// I/O error while reading input or writing output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Block index out of range
    #[error("Block index out of range: {0}")]
    InvalidIndex(u32),

    /// Generic error with custom message
    #[error("{0}")]
    Other(String),
}

impl ElltwoError {
    /// Create a generic error
    pub fn other(reason: impl Into<String>) -> Self {
        Self::Other(reason.into())
    }
}

/// Result type for elltwo operations
pub type ElltwoResult<T> = Result<T, ElltwoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_stuck() {
        let err = ParseError::stuck(2, Some(7));
        assert_eq!(err, ParseError::Stuck { offset: 2, byte: 7 });
        assert!(err.to_string().contains("offset 2"));
        assert!(err.to_string().contains("0x07"));
    }

    #[test]
    fn test_parse_error_stuck_past_end() {
        let err = ParseError::stuck(0, None);
        assert_eq!(err, ParseError::Stuck { offset: 0, byte: 0 });
    }

    #[test]
    fn test_render_error_graphics() {
        let err = RenderError::graphics("bad gum");
        assert!(err.to_string().contains("bad gum"));
    }

    #[test]
    fn test_elltwo_error_from_parse_error() {
        let parse_err = ParseError::other("test error");
        let err: ElltwoError = parse_err.into();
        assert!(err.to_string().contains("test error"));
    }

    #[test]
    fn test_elltwo_error_invalid_index() {
        let err = ElltwoError::InvalidIndex(9);
        assert!(err.to_string().contains("index"));
        assert!(err.to_string().contains('9'));
    }

    #[test]
    fn test_config_error_from_toml() {
        let toml_err = toml::from_str::<toml::Table>("not = [valid").unwrap_err();
        let err: ConfigError = toml_err.into();
        assert!(err.to_string().starts_with("Failed to parse config"));
    }

    #[test]
    fn test_serialization_error_unsupported() {
        let err = SerializationError::unsupported_format("yaml");
        assert!(err.to_string().contains("yaml"));
    }
}
