//! Centralized error types for mailrules.
//!
//! Only the host-side plumbing (rules file, mailbox, `.eml` import) can fail.
//! The automation engine itself never returns an error.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mailrules library.
#[derive(Error, Debug)]
pub enum MailRulesError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// A JSON document (rules file or email store) could not be decoded or encoded.
    #[error("Invalid JSON in '{path}': {source}")]
    InvalidJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// An `.eml` file could not be parsed as an RFC 5322 message.
    #[error("Not a parseable email message: {0}")]
    InvalidEml(PathBuf),

    /// A mailbox in a forwarded message is not a valid address.
    #[error("Invalid email address '{address}': {source}")]
    InvalidAddress {
        address: String,
        source: lettre::address::AddressError,
    },

    /// A forwarded message could not be assembled.
    #[error("Could not build forwarded message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// A textual condition or action definition is malformed.
    #[error("Invalid rule definition '{input}': {reason}")]
    InvalidDefinition { input: String, reason: String },
}

/// Convenience alias for `Result<T, MailRulesError>`.
pub type Result<T> = std::result::Result<T, MailRulesError>;

impl MailRulesError {
    /// Create an `Io` variant from a path and an `io::Error`.
    ///
    /// A `NotFound` error is mapped to [`MailRulesError::FileNotFound`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::FileNotFound(path);
        }
        Self::Io { path, source }
    }

    /// Create an `InvalidJson` variant from a path and a `serde_json::Error`.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::InvalidJson {
            path: path.into(),
            source,
        }
    }
}
