//! # Error Module
//!
//! Error types for the media deduplicator.
//!
//! ## Taxonomy
//! - [`ScanError`] - one path could not be enumerated or stat'ed. Counted and skipped.
//! - [`CopyError`] - one survivor could not be materialized. Counted and skipped.
//! - [`ConfigError`] - the run cannot start. Aborts before any file is touched.
//!
//! Metadata lookups never produce an error here; a failed lookup simply
//! means the file has no recoverable creation time.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum MediaDedupError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Copy error: {0}")]
    Copy(#[from] CopyError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors that occur while discovering or stat'ing a single path
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a regular file: {path}")]
    NotAFile { path: PathBuf },
}

impl ScanError {
    /// The path this error is about
    pub fn path(&self) -> &PathBuf {
        match self {
            ScanError::DirectoryNotFound { path }
            | ScanError::ReadDirectory { path, .. }
            | ScanError::Stat { path, .. }
            | ScanError::NotAFile { path } => path,
        }
    }
}

/// Errors that occur while copying a single survivor
#[derive(Error, Debug)]
pub enum CopyError {
    #[error("Failed to create destination {path}: {source}")]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("open: {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("mkdir: {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("create: {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("copy: {path}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that prevent a run from starting
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Source directory '{path}' does not exist")]
    SourceNotFound { path: PathBuf },

    #[error("Source '{path}' is not a directory")]
    SourceNotDirectory { path: PathBuf },

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    #[error("No image or video extensions configured")]
    NoExtensions,

    #[error("Worker {worker} failed to initialize its metadata source: {reason}")]
    WorkerInit { worker: usize, reason: String },

    #[error("Failed to build copy thread pool: {0}")]
    ThreadPool(String),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, MediaDedupError>;
