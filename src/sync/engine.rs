//! File-sync engine
//!
//! Handles a single (artifact kind, repository) attempt:
//! discover sources → clone → copy → diff-check → commit → push.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::SyncResult;
use crate::artifact::{ArtifactKind, GIT_USER_EMAIL, GIT_USER_NAME};
use crate::error::{Result, SyncError};
use crate::git::{DEFAULT_BRANCH, Git};
use crate::github::RepoRef;
use crate::process::CommandRunner;

/// Prefix of the temporary directory holding each clone
pub const TEMP_DIR_PREFIX: &str = "reposync-";

/// A file found under a kind's source directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the kind's source directory
    pub relative: PathBuf,
}

/// Runs sync attempts for one project root
pub struct Syncer<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
    project_root: PathBuf,
}

impl<'a, R: CommandRunner + ?Sized> Syncer<'a, R> {
    pub fn new(runner: &'a R, project_root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            project_root: project_root.into(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Absolute source directory for `kind`
    pub fn source_dir(&self, kind: ArtifactKind) -> PathBuf {
        self.project_root.join(kind.source_dir())
    }

    /// Find every file of `kind` under its source directory, in a stable order.
    pub fn collect_sources(&self, kind: ArtifactKind) -> Result<Vec<SourceFile>> {
        let source_dir = self.source_dir(kind);
        if !source_dir.is_dir() {
            return Err(SyncError::Config(format!(
                "{} source directory not found: {}",
                kind.label(),
                source_dir.display()
            )));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&source_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                SyncError::io(
                    format!("Failed to read {}", source_dir.display()),
                    e.into(),
                )
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&source_dir) else {
                continue;
            };
            if kind.accepts(relative) {
                files.push(SourceFile {
                    path: entry.path().to_path_buf(),
                    relative: relative.to_path_buf(),
                });
            }
        }

        Ok(files)
    }

    /// Sync one artifact kind into one repository.
    ///
    /// Never fails: any error is captured in the returned result. The
    /// temporary clone is removed before this returns.
    pub fn sync_artifacts(&self, kind: ArtifactKind, repo: &RepoRef) -> SyncResult {
        match self.try_sync(kind, repo) {
            Ok((synced, pushed)) => {
                tracing::info!(
                    repo = %repo,
                    kind = %kind,
                    files = synced.len(),
                    pushed,
                    "Sync attempt succeeded"
                );
                SyncResult::succeeded(repo.clone(), kind, synced, pushed)
            }
            Err(e) => {
                tracing::warn!(repo = %repo, kind = %kind, code = e.code(), error = %e, "Sync attempt failed");
                SyncResult::failed(repo.clone(), kind, e.to_string())
            }
        }
    }

    fn try_sync(&self, kind: ArtifactKind, repo: &RepoRef) -> Result<(Vec<String>, bool)> {
        let sources = self.collect_sources(kind)?;
        if sources.is_empty() {
            tracing::debug!(kind = %kind, "No source files, nothing to sync");
            return Ok((Vec::new(), false));
        }

        // Dropping the guard removes the clone on every return path.
        let temp_dir = tempfile::Builder::new()
            .prefix(TEMP_DIR_PREFIX)
            .tempdir()
            .map_err(|e| SyncError::io("Failed to create temporary directory", e))?;
        let clone_dir = temp_dir.path().join("target");

        let outcome = self.sync_into_clone(kind, repo, &sources, &clone_dir);

        let temp_path = temp_dir.path().to_path_buf();
        if let Err(e) = temp_dir.close() {
            tracing::warn!(path = %temp_path.display(), error = %e, "Failed to remove temporary clone");
        }

        outcome
    }

    fn sync_into_clone(
        &self,
        kind: ArtifactKind,
        repo: &RepoRef,
        sources: &[SourceFile],
        clone_dir: &Path,
    ) -> Result<(Vec<String>, bool)> {
        let git = Git::new(self.runner);
        git.clone_repo(repo, clone_dir)?;

        let dest_root = clone_dir.join(kind.dest_dir());
        let synced = copy_sources(kind, sources, &dest_root)?;

        if !git.has_changes(clone_dir)? {
            tracing::debug!(repo = %repo, kind = %kind, "Clone already up to date");
            return Ok((synced, false));
        }

        let dest_spec = format!("{}/", kind.dest_dir());
        git.add(clone_dir, &[dest_spec.as_str()])?;
        git.commit(clone_dir, kind.commit_message(), GIT_USER_NAME, GIT_USER_EMAIL)?;
        git.push(clone_dir, DEFAULT_BRANCH)?;

        Ok((synced, true))
    }
}

/// Copy sources under `dest_root`, returning the written relative paths.
fn copy_sources(kind: ArtifactKind, sources: &[SourceFile], dest_root: &Path) -> Result<Vec<String>> {
    let mut synced = Vec::new();
    let mut seen = HashSet::new();

    for source in sources {
        let relative = kind.target_relative_path(&source.relative);
        let target = dest_root.join(&relative);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| SyncError::io(format!("Failed to create {}", parent.display()), e))?;
        }
        fs::copy(&source.path, &target).map_err(|e| {
            SyncError::io(
                format!("Failed to copy {}", source.path.display()),
                e,
            )
        })?;

        let shown = slash_path(&relative);
        if seen.insert(shown.clone()) {
            synced.push(shown);
        } else {
            tracing::warn!(
                file = %shown,
                source = %source.path.display(),
                "Workflow file name collision, later file overwrites earlier one"
            );
        }
    }

    Ok(synced)
}

/// Render a relative path with `/` separators on every platform
fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Sync one kind into one repository; see [`Syncer::sync_artifacts`].
pub fn sync_artifacts<R: CommandRunner + ?Sized>(
    runner: &R,
    project_root: &Path,
    repo: &RepoRef,
    kind: ArtifactKind,
) -> SyncResult {
    Syncer::new(runner, project_root).sync_artifacts(kind, repo)
}
