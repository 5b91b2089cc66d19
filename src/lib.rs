//! reposync - sync workflows and agents to GitHub repositories
//!
//! Copies `.github/workflows` and `.claude/agents` from a project into one
//! repository or every repository of an organization. Each target is cloned
//! into a temporary directory, updated, committed and pushed through the
//! system `git`; repository discovery and authentication go through `gh`.

pub mod artifact;
pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod process;
pub mod sync;
pub mod wizard;

pub use artifact::ArtifactKind;
pub use config::{Config, Mode, SyncOptions};
pub use error::{Result, SyncError};
pub use github::RepoRef;
pub use process::{CommandOutput, CommandRunner, SystemRunner};
pub use sync::{
    SyncProgress, SyncReport, SyncResult, SyncSummary, Syncer, get_sync_summary, sync_artifacts, sync_to_repos,
    sync_to_repos_with_progress,
};
