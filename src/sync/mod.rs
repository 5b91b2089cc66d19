//! Sync module
//!
//! One sync attempt copies the files of one artifact kind into a fresh
//! clone of one repository and pushes them if anything changed. The
//! orchestrator runs attempts for every enabled kind and repository.

pub mod engine;
pub mod orchestrator;

pub use engine::*;
pub use orchestrator::*;

use crate::artifact::ArtifactKind;
use crate::github::RepoRef;

/// Outcome of a single sync attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub repo: RepoRef,
    pub kind: ArtifactKind,
    pub success: bool,
    /// Paths written into the clone, relative to the kind's destination dir
    pub synced: Vec<String>,
    pub error: Option<String>,
    /// Whether a commit was pushed
    pub pushed: bool,
}

impl SyncResult {
    pub fn succeeded(repo: RepoRef, kind: ArtifactKind, synced: Vec<String>, pushed: bool) -> Self {
        Self {
            repo,
            kind,
            success: true,
            synced,
            error: None,
            pushed,
        }
    }

    pub fn failed(repo: RepoRef, kind: ArtifactKind, error: impl Into<String>) -> Self {
        Self {
            repo,
            kind,
            success: false,
            synced: Vec::new(),
            error: Some(error.into()),
            pushed: false,
        }
    }
}
