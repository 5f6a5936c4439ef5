// src/error.rs

//! Error types for rpmget
//!
//! Library code returns [`Result`] with a single [`Error`] enum. Most
//! variants carry a formatted context string so the caller sees which
//! file or URL was involved; configuration problems keep their own
//! tagged [`ConfigError`] so callers can branch on the kind.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors produced by the rpmget library
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem failure (unreadable file, uncreatable directory, ...)
    #[error("I/O error: {0}")]
    IoError(String),

    /// Malformed manifest or other structured data
    #[error("Parse error: {0}")]
    ParseError(String),

    /// HTTP transfer failure
    #[error("Download error: {0}")]
    DownloadError(String),

    /// Failed to set up a client or other runtime resource
    #[error("Initialization error: {0}")]
    InitError(String),

    /// A required file, directory, or program is missing
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Downloaded content did not match the expected digest
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    /// Invalid or unusable configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for rpmget operations
pub type Result<T> = std::result::Result<T, Error>;
