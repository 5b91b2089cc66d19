//! Error taxonomy
//!
//! Every failure the sync pipeline can produce falls into one of a small,
//! closed set of kinds. Startup code matches on the kind to decide whether
//! the run can continue; per-repository attempts turn any kind into a line
//! in the final summary.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// A required local file or directory is missing or unreadable
    #[error("{0}")]
    Config(String),

    /// A git subprocess failed (clone, commit, push, ...)
    #[error("{0}")]
    Git(String),

    /// The gh CLI is missing or a repository listing failed
    #[error("{0}")]
    GitHub(String),

    /// The gh CLI is installed but not logged in
    #[error("{0}")]
    Authentication(String),

    /// A filesystem operation failed while staging files
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl SyncError {
    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            SyncError::Config(_) => "CONFIG_ERROR",
            SyncError::Git(_) => "GIT_ERROR",
            SyncError::GitHub(_) => "GITHUB_ERROR",
            SyncError::Authentication(_) => "AUTH_ERROR",
            SyncError::Io { .. } => "IO_ERROR",
        }
    }

    /// Whether this error ends the run when raised before any sync attempt.
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::Config(_) | SyncError::GitHub(_) | SyncError::Authentication(_)
        )
    }

    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        SyncError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
