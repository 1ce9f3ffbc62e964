//! Custom error types for zipvault
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for zipvault operations
#[derive(Error, Debug)]
pub enum VaultError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// ZIP archive creation/extraction errors
    #[error("Archive error: {0}")]
    Archive(String),

    /// Manifest file errors (malformed content, wrong schema version)
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Generated archive path exceeds the filesystem name limit
    #[error("Archive path too long ({length} characters): {path}")]
    NameTooLong { path: String, length: usize },

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Invalid glob pattern for name filtering
    #[error("Invalid name pattern: {0}")]
    Pattern(String),

    /// Invalid date argument
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Restore destination could not be resolved
    #[error("Restore error: {0}")]
    Restore(String),
}

impl VaultError {
    /// Create a "not found" error for backup roots
    pub fn backup_root_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup root",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for date directories
    pub fn date_dir_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Date directory",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for archives
    pub fn archive_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Archive",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<zip::result::ZipError> for VaultError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

impl From<globset::Error> for VaultError {
    fn from(err: globset::Error) -> Self {
        Self::Pattern(err.to_string())
    }
}

impl From<chrono::ParseError> for VaultError {
    fn from(err: chrono::ParseError) -> Self {
        Self::InvalidDate(err.to_string())
    }
}

/// Result type alias for zipvault operations
pub type VaultResult<T> = Result<T, VaultError>;
