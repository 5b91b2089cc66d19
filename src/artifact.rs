//! Artifact kinds
//!
//! The two categories of files that get synchronized, and the fixed rules
//! for where each one is read from and written to.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Source directory for workflow definitions (relative to the project root)
pub const WORKFLOW_SOURCE_PATH: &str = ".github/workflows";

/// Source directory for agent definitions (relative to the project root)
pub const AGENTS_SOURCE_PATH: &str = ".claude/agents";

/// Path segment that keeps a workflow out of the sync
pub const DISABLED_SEGMENT: &str = "disabled";

/// Author name used for sync commits
pub const GIT_USER_NAME: &str = "Claude Code";

/// Author email used for sync commits
pub const GIT_USER_EMAIL: &str = "noreply@anthropic.com";

pub const WORKFLOW_COMMIT_MESSAGE: &str = "🤖 ci(sync): sync workflows from claude-glm-actions-lab

Co-Authored-By: Claude <noreply@anthropic.com>";

pub const AGENTS_COMMIT_MESSAGE: &str = "🤖 chore(agents): sync agents from claude-glm-actions-lab

Co-Authored-By: Claude <noreply@anthropic.com>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Workflows,
    Agents,
}

impl ArtifactKind {
    /// All kinds, in the order they are synced and reported
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::Workflows, ArtifactKind::Agents];

    pub fn label(self) -> &'static str {
        match self {
            ArtifactKind::Workflows => "Workflows",
            ArtifactKind::Agents => "Agents",
        }
    }

    /// Directory the files are read from, relative to the project root
    pub fn source_dir(self) -> &'static str {
        match self {
            ArtifactKind::Workflows => WORKFLOW_SOURCE_PATH,
            ArtifactKind::Agents => AGENTS_SOURCE_PATH,
        }
    }

    /// Directory the files are written to, relative to the clone root.
    /// Mirrors the source layout.
    pub fn dest_dir(self) -> &'static str {
        self.source_dir()
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ArtifactKind::Workflows => &["yml", "yaml"],
            ArtifactKind::Agents => &["md", "json", "yml", "yaml"],
        }
    }

    pub fn commit_message(self) -> &'static str {
        match self {
            ArtifactKind::Workflows => WORKFLOW_COMMIT_MESSAGE,
            ArtifactKind::Agents => AGENTS_COMMIT_MESSAGE,
        }
    }

    /// Whether a file at `rel_path` (relative to the source dir) is synced.
    pub fn accepts(self, rel_path: &Path) -> bool {
        let extension_ok = rel_path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions().contains(&ext));
        if !extension_ok {
            return false;
        }

        match self {
            ArtifactKind::Workflows => !rel_path
                .components()
                .any(|c| matches!(c, Component::Normal(name) if name == DISABLED_SEGMENT)),
            ArtifactKind::Agents => true,
        }
    }

    /// Where a source file lands, relative to the destination dir.
    ///
    /// Workflows are flattened to their file name (GitHub only reads the top
    /// level of `.github/workflows`); agents keep their sub-directories.
    pub fn target_relative_path(self, rel_path: &Path) -> PathBuf {
        match self {
            ArtifactKind::Workflows => rel_path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| rel_path.to_path_buf()),
            ArtifactKind::Agents => rel_path.to_path_buf(),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
