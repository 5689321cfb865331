//! Error types for hydromon.
//!
//! This module defines all error types used throughout the hydromon crate,
//! covering candidate validation, missing entries, rejected photo payloads,
//! and failures of the storage and configuration layers.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for hydromon operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Domain Errors ===
    /// A candidate entry failed a validation check.
    #[error("validation failed for '{field}': {message}")]
    Validation {
        /// Wire-format name of the offending field.
        field: &'static str,
        /// Human-readable description of the failure.
        message: String,
    },

    /// The referenced entry does not exist.
    #[error("entry {id} not found")]
    NotFound {
        /// Identifier that was looked up.
        id: i64,
    },

    /// A photo payload was rejected by the type/size policy.
    #[error("photo upload rejected: {reason}")]
    Upload {
        /// Why the payload was rejected.
        reason: String,
    },

    /// Boundary input could not be parsed into a candidate value.
    #[error("could not parse {what}: {message}")]
    Parse {
        /// What was being parsed (e.g. "date", "plant type").
        what: &'static str,
        /// Description of the parse failure.
        message: String,
    },

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
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

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
}

/// A specialized Result type for hydromon operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error for the given field.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a new upload rejection error.
    #[must_use]
    pub fn upload(reason: impl Into<String>) -> Self {
        Self::Upload {
            reason: reason.into(),
        }
    }

    /// Create a new parse error.
    #[must_use]
    pub fn parse(what: &'static str, message: impl Into<String>) -> Self {
        Self::Parse {
            what,
            message: message.into(),
        }
    }

    /// Check if this error is a validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error means the entry was not found.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error is a rejected photo payload.
    #[must_use]
    pub fn is_upload(&self) -> bool {
        matches!(self, Self::Upload { .. })
    }

    /// The field a validation error refers to, if any.
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = Error::validation("ph", "pH cannot exceed 14");
        assert_eq!(err.to_string(), "validation failed for 'ph': pH cannot exceed 14");
        assert!(err.is_validation());
        assert_eq!(err.field(), Some("ph"));
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::NotFound { id: 42 };
        assert_eq!(err.to_string(), "entry 42 not found");
        assert!(err.is_not_found());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_upload_error_display() {
        let err = Error::upload("payload exceeds 5000000 bytes");
        assert_eq!(
            err.to_string(),
            "photo upload rejected: payload exceeds 5000000 bytes"
        );
        assert!(err.is_upload());
    }

    #[test]
    fn test_parse_error_display() {
        let err = Error::parse("date", "invalid calendar date '2024-13-01'");
        let msg = err.to_string();
        assert!(msg.contains("date"));
        assert!(msg.contains("2024-13-01"));
    }

    #[test]
    fn test_field_is_none_for_other_errors() {
        assert_eq!(Error::NotFound { id: 1 }.field(), None);
        assert_eq!(Error::upload("nope").field(), None);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_database_open_error_display() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err = Error::DatabaseOpen {
                path: PathBuf::from("/nonexistent/path/db.sqlite"),
                source: sqlite_err,
            };
            assert!(err.to_string().contains("/nonexistent/path/db.sqlite"));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "max_photo_bytes must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("max_photo_bytes"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
