//! Git operations on a throwaway clone
//!
//! Every call shells out to the system `git` through a [`CommandRunner`].

use std::path::Path;

use crate::error::{Result, SyncError};
use crate::github::RepoRef;
use crate::process::CommandRunner;

/// Branch pushed to first
pub const DEFAULT_BRANCH: &str = "main";

pub struct Git<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
}

impl<'a, R: CommandRunner + ?Sized> Git<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    fn exec(&self, args: &[&str], cwd: Option<&Path>) -> Result<String> {
        let subcommand = args.first().copied().unwrap_or("git");
        let output = self
            .runner
            .run("git", args, cwd)
            .map_err(|e| SyncError::Git(format!("Git command failed ({}): {}", subcommand, e)))?;

        if !output.success {
            return Err(SyncError::Git(format!(
                "Git command failed ({}): {}",
                subcommand,
                output.failure_reason()
            )));
        }

        Ok(output.stdout)
    }

    pub fn clone_repo(&self, repo: &RepoRef, dest: &Path) -> Result<()> {
        let url = repo.clone_url();
        let dest_str = dest.to_string_lossy();
        self.exec(&["clone", url.as_str(), dest_str.as_ref()], None)?;
        tracing::debug!(repo = %repo, dest = %dest.display(), "Cloned repository");
        Ok(())
    }

    pub fn status_porcelain(&self, repo_dir: &Path) -> Result<String> {
        self.exec(&["status", "--porcelain"], Some(repo_dir))
    }

    /// Whether the working tree differs from HEAD
    pub fn has_changes(&self, repo_dir: &Path) -> Result<bool> {
        Ok(!self.status_porcelain(repo_dir)?.trim().is_empty())
    }

    pub fn add(&self, repo_dir: &Path, paths: &[&str]) -> Result<()> {
        let mut args = vec!["add"];
        args.extend_from_slice(paths);
        self.exec(&args, Some(repo_dir)).map(|_| ())
    }

    /// Set the author identity on the clone, then commit what is staged.
    pub fn commit(&self, repo_dir: &Path, message: &str, user_name: &str, user_email: &str) -> Result<()> {
        self.exec(&["config", "user.name", user_name], Some(repo_dir))?;
        self.exec(&["config", "user.email", user_email], Some(repo_dir))?;
        self.exec(&["commit", "-m", message], Some(repo_dir))?;
        Ok(())
    }

    /// Push `branch` to origin, falling back once to pushing `HEAD`.
    ///
    /// At most two push attempts are made.
    pub fn push(&self, repo_dir: &Path, branch: &str) -> Result<()> {
        match self.exec(&["push", "origin", branch], Some(repo_dir)) {
            Ok(_) => Ok(()),
            Err(first) => {
                tracing::warn!(branch, error = %first, "Push failed, retrying with HEAD");
                self.exec(&["push", "origin", "HEAD"], Some(repo_dir))
                    .map(|_| ())
                    .map_err(|second| {
                        SyncError::Git(format!(
                            "Push failed for {} ({}) and HEAD ({})",
                            branch, first, second
                        ))
                    })
            }
        }
    }
}
