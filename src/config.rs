//! Configuration for reposync
//!
//! Settings are resolved once at startup from built-in defaults and an
//! optional `.env` file in the project root. A [`Config`] is never changed
//! in place; every adjustment the wizard makes produces a new value.

use std::fs;
use std::path::{Path, PathBuf};

use crate::artifact::ArtifactKind;
use crate::error::{Result, SyncError};

/// Name of the settings file in the project root
pub const ENV_FILE_NAME: &str = ".env";

/// Template the settings file can be created from
pub const ENV_TEMPLATE_NAME: &str = ".env.example";

pub const DEFAULT_TARGET_REPO: &str = "Sunwood-ai-labs/claude-glm-actions-lab-sandbox";
pub const DEFAULT_TARGET_ORG: &str = "Sunwood-ai-labs";
pub const DEFAULT_EXCLUDED_REPOS: &[&str] = &["claude-glm-actions-lab-sandbox"];

/// Whether to target one repository or a whole organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Single,
    Org,
}

/// Which artifact kinds are synced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    pub workflows: bool,
    pub agents: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            workflows: true,
            agents: true,
        }
    }
}

impl SyncOptions {
    pub fn is_enabled(&self, kind: ArtifactKind) -> bool {
        match kind {
            ArtifactKind::Workflows => self.workflows,
            ArtifactKind::Agents => self.agents,
        }
    }

    /// Copy of these options with `kind` flipped
    pub fn toggled(self, kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::Workflows => Self {
                workflows: !self.workflows,
                ..self
            },
            ArtifactKind::Agents => Self {
                agents: !self.agents,
                ..self
            },
        }
    }

    pub fn any_enabled(&self) -> bool {
        ArtifactKind::ALL.iter().any(|kind| self.is_enabled(*kind))
    }

    /// Enabled kinds in sync order
    pub fn enabled_kinds(&self) -> Vec<ArtifactKind> {
        ArtifactKind::ALL
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
            .collect()
    }
}

/// Values recognized in the `.env` file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnvValues {
    pub target_repo: Option<String>,
    pub target_org: Option<String>,
    pub excluded_repos: Option<String>,
}

impl EnvValues {
    /// Read `<project_root>/.env`. A missing file yields no values.
    ///
    /// Lines are parsed one at a time with `dotenvy`. A line it rejects (for
    /// example an unquoted value with spaces, `EXCLUDED_REPOS=a, b`) is read
    /// as a plain `KEY=value` pair instead of failing the whole file.
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(ENV_FILE_NAME);
        if !path.is_file() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| SyncError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let mut values = Self::default();
        for (index, line) in contents.lines().enumerate() {
            let Some((key, value)) = parse_env_line(line).map_err(|e| {
                SyncError::Config(format!(
                    "Failed to parse {} line {}: {}",
                    path.display(),
                    index + 1,
                    e
                ))
            })?
            else {
                continue;
            };

            // Empty values fall back to the defaults
            let value = Some(value).filter(|v| !v.trim().is_empty());
            match key.as_str() {
                "TARGET_REPO" => values.target_repo = value,
                "TARGET_ORG" => values.target_org = value,
                "EXCLUDED_REPOS" => values.excluded_repos = value,
                other => tracing::debug!(key = other, "Ignoring unknown .env key"),
            }
        }

        Ok(values)
    }
}

/// Parse one `.env` line; `None` for blank lines and comments.
fn parse_env_line(line: &str) -> std::result::Result<Option<(String, String)>, dotenvy::Error> {
    match dotenvy::from_read_iter(line.as_bytes()).next() {
        None => Ok(None),
        Some(Ok(pair)) => Ok(Some(pair)),
        Some(Err(dotenvy::Error::LineParse(..))) => {
            let pair = plain_pair(line);
            if pair.is_none() {
                tracing::debug!(line, "Skipping unparsable .env line");
            }
            Ok(pair)
        }
        Some(Err(e)) => Err(e),
    }
}

/// `KEY=value` split on the first `=`, both sides trimmed
fn plain_pair(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }

    let value = value.trim();
    let value = ['"', '\'']
        .iter()
        .find_map(|q| value.strip_prefix(*q).and_then(|v| v.strip_suffix(*q)))
        .unwrap_or(value);

    Some((key.to_string(), value.to_string()))
}

/// Resolved run-time settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub project_root: PathBuf,
    pub target_repo: String,
    pub target_org: String,
    pub excluded_repos: Vec<String>,
    pub sync_options: SyncOptions,
    pub mode: Mode,
}

impl Config {
    /// Resolve the configuration for a project root (defaults < `.env`).
    pub fn load(project_root: &Path) -> Result<Self> {
        let env = EnvValues::load(project_root)?;
        Ok(Self::from_env(project_root, env))
    }

    /// Build a configuration from already-read `.env` values
    pub fn from_env(project_root: &Path, env: EnvValues) -> Self {
        let excluded_repos = match env.excluded_repos {
            Some(list) => parse_excluded_repos(&list),
            None => DEFAULT_EXCLUDED_REPOS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        Self {
            project_root: project_root.to_path_buf(),
            target_repo: env
                .target_repo
                .unwrap_or_else(|| DEFAULT_TARGET_REPO.to_string()),
            target_org: env
                .target_org
                .unwrap_or_else(|| DEFAULT_TARGET_ORG.to_string()),
            excluded_repos,
            sync_options: SyncOptions::default(),
            mode: Mode::default(),
        }
    }

    /// New configuration with the sync flag for `kind` inverted
    pub fn toggled(&self, kind: ArtifactKind) -> Self {
        Self {
            sync_options: self.sync_options.toggled(kind),
            ..self.clone()
        }
    }

    pub fn has_enabled_sync_item(&self) -> bool {
        self.sync_options.any_enabled()
    }

    pub fn with_target_repo(&self, target_repo: impl Into<String>) -> Self {
        Self {
            target_repo: target_repo.into(),
            ..self.clone()
        }
    }

    pub fn with_target_org(&self, target_org: impl Into<String>) -> Self {
        Self {
            target_org: target_org.into(),
            ..self.clone()
        }
    }

    pub fn with_mode(&self, mode: Mode) -> Self {
        Self {
            mode,
            ..self.clone()
        }
    }
}

/// Returns a new configuration with the named sync flag inverted.
pub fn toggle_sync_option(config: &Config, kind: ArtifactKind) -> Config {
    config.toggled(kind)
}

/// True when at least one artifact kind is enabled.
pub fn has_enabled_sync_item(config: &Config) -> bool {
    config.has_enabled_sync_item()
}

/// Split a comma-separated exclusion list, trimming entries and dropping empty ones
pub fn parse_excluded_repos(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn env_file_exists(project_root: &Path) -> bool {
    project_root.join(ENV_FILE_NAME).is_file()
}

pub fn env_template_exists(project_root: &Path) -> bool {
    project_root.join(ENV_TEMPLATE_NAME).is_file()
}

/// Create `.env` from `.env.example`, returning the new file's path.
///
/// An existing `.env` is never overwritten.
pub fn create_env_from_template(project_root: &Path) -> Result<PathBuf> {
    let template = project_root.join(ENV_TEMPLATE_NAME);
    let target = project_root.join(ENV_FILE_NAME);

    if !template.is_file() {
        return Err(SyncError::Config(format!(
            "{} not found: {}",
            ENV_TEMPLATE_NAME,
            template.display()
        )));
    }
    if target.exists() {
        return Err(SyncError::Config(format!(
            "{} already exists: {}",
            ENV_FILE_NAME,
            target.display()
        )));
    }

    fs::copy(&template, &target)
        .map_err(|e| SyncError::io(format!("Failed to create {}", target.display()), e))?;
    tracing::info!(path = %target.display(), "Created .env from template");

    Ok(target)
}
