//! Interactive sync wizard
//!
//! The driver loop draws the current state, performs the effect the last
//! transition requested (if any), and otherwise waits for a key. Ctrl+C is
//! polled after each effect and between sync attempts.

pub mod render;
pub mod state;
pub mod terminal;

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use anyhow::Result;
use ratatui::text::Line;

pub use render::{plain_text, progress_line, render, render_syncing};
pub use state::{Effect, Key, WizardEvent, WizardState, start, transition};
pub use terminal::{CrosstermTerminal, Terminal, print_view};

use crate::config::{Config, create_env_from_template, env_file_exists, env_template_exists};
use crate::error::SyncError;
use crate::github::{RepoRef, get_org_repos, perform_github_checks};
use crate::process::{CommandRunner, SystemRunner};
use crate::sync::{Syncer, get_sync_summary, sync_to_repos_with_progress};

pub struct Wizard<'a, R: CommandRunner + ?Sized, T: Terminal> {
    runner: &'a R,
    terminal: T,
    project_root: PathBuf,
}

impl<'a, R: CommandRunner + ?Sized, T: Terminal> Wizard<'a, R, T> {
    pub fn new(runner: &'a R, terminal: T, project_root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            terminal,
            project_root: project_root.into(),
        }
    }

    /// Run until a terminal state is reached and return it.
    pub fn run(&mut self) -> Result<WizardState> {
        let (mut state, mut effect) = start();

        loop {
            self.terminal.draw(&render(&state))?;

            if let Some(pending) = effect.take() {
                let event = self.perform(pending);
                (state, effect) = transition(state, event);
                if !state.is_terminal() && self.terminal.poll_key()? == Some(Key::CtrlC) {
                    (state, effect) = transition(state, WizardEvent::Key(Key::CtrlC));
                }
                continue;
            }

            if state.is_terminal() {
                tracing::debug!(?state, "Wizard finished");
                return Ok(state);
            }

            let key = self.terminal.read_key()?;
            (state, effect) = transition(state, WizardEvent::Key(key));
        }
    }

    pub fn into_terminal(self) -> T {
        self.terminal
    }

    fn perform(&mut self, effect: Effect) -> WizardEvent {
        tracing::debug!(?effect, "Performing effect");
        match effect {
            Effect::CheckEnv => WizardEvent::EnvChecked {
                present: env_file_exists(&self.project_root),
                template_available: env_template_exists(&self.project_root),
            },
            Effect::CreateEnvFile => WizardEvent::EnvCreated(create_env_from_template(&self.project_root)),
            Effect::CheckGitHub => WizardEvent::GitHubChecked(
                perform_github_checks(self.runner).and_then(|()| Config::load(&self.project_root)),
            ),
            Effect::FetchRepos { org, excluded } => {
                WizardEvent::ReposFetched(get_org_repos(self.runner, &org, &excluded))
            }
            Effect::RunSync { config, repos } => self.run_sync(&config, &repos),
        }
    }

    /// Run the sync and report its summary, or a Ctrl+C if the user stopped it
    /// between attempts.
    fn run_sync(&mut self, config: &Config, repos: &[RepoRef]) -> WizardEvent {
        if repos.is_empty() {
            return WizardEvent::SyncFinished(Err(SyncError::Config("No target repositories".into())));
        }
        if !config.has_enabled_sync_item() {
            return WizardEvent::SyncFinished(Err(SyncError::Config("Nothing selected to sync".into())));
        }

        let syncer = Syncer::new(self.runner, &config.project_root);
        let terminal = &mut self.terminal;
        let mut progress: Vec<Line<'static>> = Vec::new();

        let report = sync_to_repos_with_progress(&syncer, repos, config.sync_options, |event| {
            progress.push(progress_line(&event));
            if let Err(e) = terminal.draw(&render_syncing(repos, &progress)) {
                tracing::debug!(error = %e, "Failed to draw sync progress");
            }
            match terminal.poll_key() {
                Ok(Some(Key::CtrlC)) => ControlFlow::Break(()),
                Ok(_) => ControlFlow::Continue(()),
                Err(e) => {
                    tracing::debug!(error = %e, "Failed to poll for input");
                    ControlFlow::Continue(())
                }
            }
        });

        if report.interrupted {
            return WizardEvent::Key(Key::CtrlC);
        }

        let summary = get_sync_summary(&report);
        tracing::info!(
            succeeded = summary.success_count,
            failed = summary.fail_count,
            "Sync finished"
        );
        WizardEvent::SyncFinished(Ok(summary))
    }
}

/// Run the wizard on the real terminal against the system `git` and `gh`.
///
/// The final view is printed after the terminal is restored. Returns the
/// process exit code.
pub fn run_wizard(project_root: &Path) -> Result<u8> {
    let runner = SystemRunner;
    let final_state = {
        let terminal = CrosstermTerminal::acquire()?;
        let mut wizard = Wizard::new(&runner, terminal, project_root);
        wizard.run()?
    };

    print_view(&render(&final_state));
    Ok(final_state.exit_code().unwrap_or(1))
}
