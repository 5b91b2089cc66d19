//! Wizard state machine
//!
//! The whole interactive flow is a closed set of states and a single pure
//! [`transition`] function. Anything with side effects (reading files,
//! calling `gh`, running a sync) is requested as an [`Effect`]; the driver
//! performs it and feeds the outcome back in as a [`WizardEvent`].

use std::path::PathBuf;

use crate::artifact::ArtifactKind;
use crate::config::{Config, Mode};
use crate::error::SyncError;
use crate::github::{RepoRef, is_valid_owner};
use crate::sync::SyncSummary;

pub const ENV_REQUIRED_MESSAGE: &str =
    ".env is required. Create it from .env.example, edit it, and run again";

pub const NO_REPOS_MESSAGE: &str = "No repositories left to sync after applying the exclusion list";

/// A key press, reduced to what the wizard reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Esc,
    CtrlC,
}

#[derive(Debug)]
pub enum WizardEvent {
    Key(Key),
    EnvChecked {
        present: bool,
        template_available: bool,
    },
    EnvCreated(Result<PathBuf, SyncError>),
    GitHubChecked(Result<Config, SyncError>),
    ReposFetched(Result<Vec<RepoRef>, SyncError>),
    SyncFinished(Result<SyncSummary, SyncError>),
}

/// Side effects a transition asks the driver to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CheckEnv,
    CreateEnvFile,
    /// Verify `gh`, then load the configuration
    CheckGitHub,
    FetchRepos {
        org: String,
        excluded: Vec<String>,
    },
    RunSync {
        config: Config,
        repos: Vec<RepoRef>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardState {
    Loading,
    EnvMissing {
        template_available: bool,
    },
    GitHubCheck,
    ModeSelect {
        config: Config,
    },
    RepoConfirm {
        mode: Mode,
        config: Config,
    },
    RepoInput {
        mode: Mode,
        config: Config,
        buffer: String,
        /// Set when the last submitted value was rejected
        invalid: bool,
    },
    FetchingRepos {
        config: Config,
    },
    OrgRepoList {
        config: Config,
        repos: Vec<RepoRef>,
    },
    SyncOptions {
        config: Config,
        repos: Vec<RepoRef>,
    },
    FinalConfirm {
        config: Config,
        repos: Vec<RepoRef>,
    },
    Syncing {
        config: Config,
        repos: Vec<RepoRef>,
    },
    Done {
        summary: SyncSummary,
    },
    Error {
        message: String,
        /// Code of the underlying [`SyncError`], if the failure came from one
        code: Option<&'static str>,
        /// The local setup (gh, login, files) must be fixed before a rerun
        needs_setup: bool,
    },
    Cancelled,
    EnvCreated {
        path: PathBuf,
    },
}

impl WizardState {
    /// Error state for a failure raised by the wizard itself
    pub fn error(message: impl Into<String>) -> Self {
        WizardState::Error {
            message: message.into(),
            code: None,
            needs_setup: false,
        }
    }

    /// Error state for a library error; startup-fatal kinds ask for a setup fix
    pub fn failed(error: &SyncError) -> Self {
        WizardState::Error {
            message: error.to_string(),
            code: Some(error.code()),
            needs_setup: error.is_startup_fatal(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.exit_code().is_some()
    }

    /// Process exit code for terminal states, `None` while the flow is running
    pub fn exit_code(&self) -> Option<u8> {
        match self {
            WizardState::Done { .. } | WizardState::Cancelled | WizardState::EnvCreated { .. } => {
                Some(0)
            }
            WizardState::Error { .. } => Some(1),
            _ => None,
        }
    }
}

/// Initial state and the effect that gets the flow going
pub fn start() -> (WizardState, Option<Effect>) {
    (WizardState::Loading, Some(Effect::CheckEnv))
}

/// Characters accepted while typing a repository or organization name
pub fn is_input_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.')
}

fn yes(key: Key) -> bool {
    matches!(key, Key::Char('y' | 'Y'))
}

fn no(key: Key) -> bool {
    matches!(key, Key::Char('n' | 'N') | Key::Enter | Key::Esc)
}

/// Advance the wizard by one event.
pub fn transition(state: WizardState, event: WizardEvent) -> (WizardState, Option<Effect>) {
    use WizardEvent as E;
    use WizardState as S;

    if state.is_terminal() {
        return (state, None);
    }
    if matches!(event, E::Key(Key::CtrlC)) {
        return (S::Cancelled, None);
    }

    match (state, event) {
        (
            S::Loading,
            E::EnvChecked {
                present,
                template_available,
            },
        ) => {
            if present {
                (S::GitHubCheck, Some(Effect::CheckGitHub))
            } else {
                (S::EnvMissing { template_available }, None)
            }
        }

        (S::EnvMissing { template_available }, E::Key(key)) => {
            if template_available && yes(key) {
                (S::EnvMissing { template_available }, Some(Effect::CreateEnvFile))
            } else if no(key) {
                error(ENV_REQUIRED_MESSAGE)
            } else {
                (S::EnvMissing { template_available }, None)
            }
        }
        (S::EnvMissing { .. }, E::EnvCreated(Ok(path))) => (S::EnvCreated { path }, None),
        (S::EnvMissing { .. }, E::EnvCreated(Err(e))) => (S::failed(&e), None),

        (S::GitHubCheck, E::GitHubChecked(Ok(config))) => (S::ModeSelect { config }, None),
        (S::GitHubCheck, E::GitHubChecked(Err(e))) => (S::failed(&e), None),

        (S::ModeSelect { config }, E::Key(key)) => match key {
            Key::Char('1') => repo_confirm(Mode::Single, config),
            Key::Char('2') => repo_confirm(Mode::Org, config),
            Key::Char('q') | Key::Esc => (S::Cancelled, None),
            _ => (S::ModeSelect { config }, None),
        },

        (S::RepoConfirm { mode, config }, E::Key(key)) => {
            if yes(key) {
                (
                    S::RepoInput {
                        mode,
                        config,
                        buffer: String::new(),
                        invalid: false,
                    },
                    None,
                )
            } else if no(key) {
                target_chosen(config)
            } else {
                (S::RepoConfirm { mode, config }, None)
            }
        }

        (
            S::RepoInput {
                mode,
                config,
                mut buffer,
                invalid,
            },
            E::Key(key),
        ) => match key {
            Key::Char(c) if is_input_char(c) => {
                buffer.push(c);
                (
                    S::RepoInput {
                        mode,
                        config,
                        buffer,
                        invalid: false,
                    },
                    None,
                )
            }
            Key::Backspace => {
                buffer.pop();
                (
                    S::RepoInput {
                        mode,
                        config,
                        buffer,
                        invalid: false,
                    },
                    None,
                )
            }
            Key::Esc => (S::ModeSelect { config }, None),
            Key::Enter => submit_input(mode, config, buffer),
            _ => (
                S::RepoInput {
                    mode,
                    config,
                    buffer,
                    invalid,
                },
                None,
            ),
        },

        (S::FetchingRepos { config }, E::ReposFetched(Ok(repos))) => {
            if repos.is_empty() {
                error(NO_REPOS_MESSAGE)
            } else {
                (S::OrgRepoList { config, repos }, None)
            }
        }
        (S::FetchingRepos { .. }, E::ReposFetched(Err(e))) => (S::failed(&e), None),

        (S::OrgRepoList { config, repos }, E::Key(key)) => {
            if yes(key) {
                (S::SyncOptions { config, repos }, None)
            } else if no(key) {
                (S::Cancelled, None)
            } else {
                (S::OrgRepoList { config, repos }, None)
            }
        }

        (S::SyncOptions { config, repos }, E::Key(key)) => match key {
            Key::Char('1') => (
                S::SyncOptions {
                    config: config.toggled(ArtifactKind::Workflows),
                    repos,
                },
                None,
            ),
            Key::Char('2') => (
                S::SyncOptions {
                    config: config.toggled(ArtifactKind::Agents),
                    repos,
                },
                None,
            ),
            Key::Enter if config.has_enabled_sync_item() => (S::FinalConfirm { config, repos }, None),
            Key::Esc => (S::Cancelled, None),
            _ => (S::SyncOptions { config, repos }, None),
        },

        (S::FinalConfirm { config, repos }, E::Key(key)) => {
            if yes(key) {
                let effect = Effect::RunSync {
                    config: config.clone(),
                    repos: repos.clone(),
                };
                (S::Syncing { config, repos }, Some(effect))
            } else if no(key) {
                (S::Cancelled, None)
            } else {
                (S::FinalConfirm { config, repos }, None)
            }
        }

        (S::Syncing { .. }, E::SyncFinished(Ok(summary))) => (S::Done { summary }, None),
        (S::Syncing { .. }, E::SyncFinished(Err(e))) => (S::failed(&e), None),

        (state, _) => (state, None),
    }
}

fn error(message: &str) -> (WizardState, Option<Effect>) {
    (WizardState::error(message), None)
}

fn repo_confirm(mode: Mode, config: Config) -> (WizardState, Option<Effect>) {
    (
        WizardState::RepoConfirm {
            mode,
            config: config.with_mode(mode),
        },
        None,
    )
}

/// The target (repository or organization) is settled; move on.
fn target_chosen(config: Config) -> (WizardState, Option<Effect>) {
    match config.mode {
        Mode::Single => {
            let repos = vec![RepoRef::new(config.target_repo.clone())];
            (WizardState::SyncOptions { config, repos }, None)
        }
        Mode::Org => {
            let effect = Effect::FetchRepos {
                org: config.target_org.clone(),
                excluded: config.excluded_repos.clone(),
            };
            (WizardState::FetchingRepos { config }, Some(effect))
        }
    }
}

fn submit_input(mode: Mode, config: Config, buffer: String) -> (WizardState, Option<Effect>) {
    let value = buffer.trim();
    let updated = match mode {
        Mode::Single if value.is_empty() => Some(config.clone()),
        Mode::Single => RepoRef::parse(value).map(|repo| config.with_target_repo(repo.full_name())),
        Mode::Org if value.is_empty() => Some(config.clone()),
        Mode::Org => is_valid_owner(value).then(|| config.with_target_org(value)),
    };

    match updated {
        Some(config) => target_chosen(config),
        None => (
            WizardState::RepoInput {
                mode,
                config,
                buffer,
                invalid: true,
            },
            None,
        ),
    }
}
