//! Error types for studentrec.
//!
//! This module defines all error types used throughout the studentrec crate.
//! Every variant carries enough context for the logs, while
//! [`Error::user_message`] gives the plain sentence shown at the console.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for studentrec operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Store Errors ===
    /// Failed to read a store file.
    #[error("failed to read {path}: {source}")]
    StoreRead {
        /// Path to the store file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a store file.
    #[error("failed to write {path}: {source}")]
    StoreWrite {
        /// Path to the store file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create the data directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A value cannot be persisted because it contains a store delimiter.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    // === Session Errors ===
    /// A credential row carries a role tag with no matching menu.
    #[error("unknown role '{0}'")]
    UnknownRole(String),

    // === Console Errors ===
    /// Standard input reached end of file.
    #[error("input closed")]
    InputClosed,

    /// The user pressed Ctrl-C while the terminal was in raw mode.
    #[error("interrupted")]
    Interrupted,

    /// Switching terminal modes or reading terminal events failed.
    #[error("terminal error: {0}")]
    Terminal(#[source] std::io::Error),

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
    /// Console or file system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for studentrec operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid field error.
    #[must_use]
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Check if this error means no more input will arrive.
    ///
    /// These end the interactive loop instead of being reported at a menu.
    #[must_use]
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, Self::InputClosed | Self::Interrupted)
    }

    /// The sentence shown to the console user for this error.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::StoreRead { path, .. } => {
                format!("Error: could not read {}.", file_label(path))
            }
            Self::StoreWrite { path, .. } => {
                format!("Error: could not save {}.", file_label(path))
            }
            Self::DirectoryCreate { .. } => {
                "Error: the data directory could not be created.".to_string()
            }
            Self::InvalidField { field, reason } => format!("Invalid {field}: {reason}."),
            Self::UnknownRole(_) => "Unknown role.".to_string(),
            Self::InputClosed | Self::Interrupted => String::new(),
            Self::Terminal(_) => "Error: the terminal could not be used.".to_string(),
            Self::ConfigLoad(_) | Self::ConfigValidation { .. } => {
                "Error: the configuration is invalid.".to_string()
            }
            Self::Io(_) => "Error: an input/output operation failed.".to_string(),
        }
    }
}

fn file_label(path: &std::path::Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
