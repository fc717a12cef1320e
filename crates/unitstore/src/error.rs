//! Error types for unitstore.
//!
//! This module defines all error types used throughout the unitstore crate.
//! The assignment store itself never returns these to its callers; they
//! surface from storage backends, slot decoding, configuration and the CLI.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for unitstore operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// Durable storage is absent or cannot be reached.
    #[error("storage unavailable: {message}")]
    StorageUnavailable {
        /// Description of what went wrong.
        message: String,
    },

    /// A storage slot holds text that does not decode to the expected shape.
    #[error("malformed data in slot '{key}': {message}")]
    MalformedStoredData {
        /// The slot that was being read.
        key: String,
        /// Description of the decode failure.
        message: String,
    },

    // === Project Errors ===
    /// Parking spots requested for a unit are already held by other units.
    #[error("parking spots already assigned: {}", .held.join(", "))]
    SpotsAlreadyAssigned {
        /// Each conflicting spot, formatted as `<spot> (unit <holder>)`.
        held: Vec<String>,
    },

    /// A project key is empty or contains characters not allowed in slot names.
    #[error("invalid project key '{key}'")]
    InvalidProjectKey {
        /// The rejected key.
        key: String,
    },

    /// An owner type tag is not one of the known classifications.
    #[error("unknown owner type '{value}'")]
    UnknownOwnerType {
        /// The rejected tag.
        value: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for unitstore operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new storage unavailable error.
    #[must_use]
    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            message: message.into(),
        }
    }

    /// Create a malformed stored data error for the given slot.
    #[must_use]
    pub fn malformed(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedStoredData {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means stored text could not be decoded.
    #[must_use]
    pub fn is_malformed_data(&self) -> bool {
        matches!(self, Self::MalformedStoredData { .. })
    }

    /// Check if this error means the backing storage could not be used.
    #[must_use]
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(
            self,
            Self::StorageUnavailable { .. }
                | Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DirectoryCreate { .. }
        )
    }
}
