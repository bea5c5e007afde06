//! Shared error types for the application

use std::path::{Path, PathBuf};
use thiserror::Error;

use super::DiagnosticKind;

/// Classified failure for a single report artifact.
///
/// Every variant is recovered at file granularity: a failing report never
/// aborts the run and never blocks aggregation for sibling files.
#[derive(Debug, Error)]
pub enum ReportError {
    /// No artifact at the resolved path
    #[error("no report file for: {}", path.display())]
    Missing { path: PathBuf },

    /// Artifact exists but has zero length
    #[error("empty report file: {}", path.display())]
    Empty { path: PathBuf },

    /// Artifact exists, non-empty, but cannot be opened or streamed
    #[error("report file {} cannot be read: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact opened but structural parsing failed or yielded no model
    #[error("report file {} cannot be analysed: {detail}", path.display())]
    Unparseable { path: PathBuf, detail: String },
}

impl ReportError {
    pub fn path(&self) -> &Path {
        match self {
            Self::Missing { path }
            | Self::Empty { path }
            | Self::Unreadable { path, .. }
            | Self::Unparseable { path, .. } => path,
        }
    }

    /// Diagnostic classification matching the error taxonomy.
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::Missing { .. } => DiagnosticKind::MissingReport,
            Self::Empty { .. } => DiagnosticKind::EmptyReport,
            Self::Unreadable { .. } => DiagnosticKind::UnreadableReport,
            Self::Unparseable { .. } => DiagnosticKind::UnparseableReport,
        }
    }
}

/// Main error type for reportmap operations
#[derive(Debug, Error)]
pub enum Error {
    /// File system related errors
    #[error("File system error: {message}")]
    FileSystem {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Wrapped external errors
    #[error(transparent)]
    External(#[from] anyhow::Error),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Pattern errors
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
}

impl Error {
    /// Create a file system error with path context
    pub fn file_system(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::FileSystem {
            message: message.into(),
            path: Some(path.into()),
            source: None,
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
