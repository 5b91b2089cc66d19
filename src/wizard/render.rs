//! Views for each wizard state
//!
//! Rendering is a pure function of the state, producing ratatui [`Text`].
//! The same text is drawn inside the alternate screen while the wizard runs
//! and printed to stdout once the terminal is released.

use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span, Text};

use super::state::WizardState;
use crate::config::{Config, ENV_FILE_NAME, ENV_TEMPLATE_NAME, Mode};
use crate::github::RepoRef;
use crate::sync::{SyncProgress, SyncSummary, summary_line};

const HINT_QUIT: &str = "Quit: Ctrl+C";

/// Progress lines kept on screen while syncing; older ones are folded
pub const MAX_PROGRESS_LINES: usize = 16;

fn hint(text: &str) -> Line<'static> {
    Line::from(text.to_string()).dark_gray()
}

fn blank() -> Line<'static> {
    Line::default()
}

fn banner() -> Vec<Line<'static>> {
    vec![
        Line::from("GitHub Repository Sync").cyan().bold(),
        hint("Sync workflows and agents to your repositories"),
        blank(),
    ]
}

fn status(text: String) -> Line<'static> {
    Line::from(vec![Span::from("… ").yellow(), Span::from(text)])
}

fn on_off(label: &str, number: char, enabled: bool) -> Line<'static> {
    let (state, color) = if enabled {
        ("ON", Color::Green)
    } else {
        ("OFF", Color::Red)
    };
    Line::from(vec![
        Span::from(format!("  [{}] {}: ", number, label)),
        Span::styled(state, Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ])
}

fn repo_list(repos: &[RepoRef]) -> Vec<Line<'static>> {
    repos
        .iter()
        .map(|repo| Line::from(format!("  - {}", repo)))
        .collect()
}

fn target_line(config: &Config, mode: Mode) -> Line<'static> {
    match mode {
        Mode::Single => Line::from(format!("Repository: {}", config.target_repo)).yellow(),
        Mode::Org => Line::from(format!("Organization: {}", config.target_org)).yellow(),
    }
}

/// Render the view for a state.
pub fn render(state: &WizardState) -> Text<'static> {
    let lines = match state {
        WizardState::Loading => vec![status(format!("Checking for {}", ENV_FILE_NAME))],

        WizardState::EnvMissing { template_available } => {
            let mut lines = vec![
                Line::from(format!("Warning: {} file not found", ENV_FILE_NAME))
                    .yellow()
                    .bold(),
                blank(),
                Line::from(format!(
                    "Copy {} to {}, adjust it, and run again.",
                    ENV_TEMPLATE_NAME, ENV_FILE_NAME
                )),
                blank(),
            ];
            if *template_available {
                lines.push(
                    Line::from(format!(
                        "Press y to create {} from {} now",
                        ENV_FILE_NAME, ENV_TEMPLATE_NAME
                    ))
                    .cyan(),
                );
            }
            lines.push(hint("Press Enter to exit"));
            lines
        }

        WizardState::GitHubCheck => vec![status("Checking GitHub CLI authentication".to_string())],

        WizardState::ModeSelect { .. } => {
            let mut lines = banner();
            lines.extend([
                Line::from("Select a sync mode:").bold(),
                blank(),
                Line::from("  [1] Single repository"),
                Line::from("  [2] Every repository in an organization (exclusion list applies)"),
                blank(),
                hint("Quit: Ctrl+C or q"),
            ]);
            lines
        }

        WizardState::RepoConfirm { mode, config } => {
            let mut lines = vec![target_line(config, *mode)];
            if *mode == Mode::Org && !config.excluded_repos.is_empty() {
                lines.push(hint(&format!("Excluded: {}", config.excluded_repos.join(", "))));
            }
            let noun = match mode {
                Mode::Single => "repository",
                Mode::Org => "organization",
            };
            lines.extend([
                blank(),
                Line::from(format!("Use a different {}? (y/N)", noun)),
                blank(),
                hint(HINT_QUIT),
            ]);
            lines
        }

        WizardState::RepoInput {
            mode,
            config,
            buffer,
            invalid,
        } => {
            let (prompt, current) = match mode {
                Mode::Single => ("Repository (owner/name):", config.target_repo.as_str()),
                Mode::Org => ("Organization:", config.target_org.as_str()),
            };
            let mut lines = vec![
                Line::from(prompt).cyan(),
                Line::from(format!("(current: {})", current)).yellow(),
                blank(),
                Line::from(vec![Span::from("> ").cyan(), Span::from(buffer.clone()), Span::from("_").dark_gray()]),
            ];
            if *invalid {
                lines.push(blank());
                let expected = match mode {
                    Mode::Single => "expected owner/name",
                    Mode::Org => "expected an organization name",
                };
                lines.push(Line::from(format!("Invalid name, {}", expected)).red());
            }
            lines.extend([
                blank(),
                hint("Enter to confirm (empty keeps current), Esc to go back"),
            ]);
            lines
        }

        WizardState::FetchingRepos { config } => vec![status(format!(
            "Fetching repositories of {}",
            config.target_org
        ))],

        WizardState::OrgRepoList { repos, .. } => {
            let mut lines = vec![Line::from(format!("Target repositories ({}):", repos.len())).green()];
            lines.extend(repo_list(repos));
            lines.extend([blank(), Line::from("Continue? (y/N)"), blank(), hint(HINT_QUIT)]);
            lines
        }

        WizardState::SyncOptions { config, repos } => {
            let options = config.sync_options;
            let mut lines = vec![
                Line::from("Choose what to sync:").bold(),
                blank(),
                on_off("Workflows", '1', options.workflows),
                on_off("Agents", '2', options.agents),
                blank(),
                Line::from(format!("Target repositories: {}", repos.len())),
            ];
            if !options.any_enabled() {
                lines.push(blank());
                lines.push(Line::from("Enable at least one item to continue").red());
            }
            lines.extend([
                blank(),
                hint("Number keys toggle, Enter confirms, Esc quits"),
            ]);
            lines
        }

        WizardState::FinalConfirm { config, repos } => {
            let items: Vec<&str> = config
                .sync_options
                .enabled_kinds()
                .into_iter()
                .map(|kind| kind.label())
                .collect();
            let mut lines = vec![
                Line::from("Ready to sync").bold(),
                blank(),
                Line::from(format!("Items: {}", items.join(", "))),
                Line::from(format!("Repositories ({}):", repos.len())),
            ];
            lines.extend(repo_list(repos));
            lines.extend([blank(), Line::from("Start the sync? (y/N)").yellow(), blank(), hint(HINT_QUIT)]);
            lines
        }

        WizardState::Syncing { repos, .. } => return render_syncing(repos, &[]),

        WizardState::Done { summary } => render_summary(summary),

        WizardState::Error {
            message,
            code,
            needs_setup,
        } => {
            let headline = match code {
                Some(code) => format!("Error [{}]: {}", code, message),
                None => format!("Error: {}", message),
            };
            vec![
                Line::from(headline).red().bold(),
                blank(),
                if *needs_setup {
                    hint("Fix the setup above and run reposync again")
                } else {
                    hint("Exiting")
                },
            ]
        }

        WizardState::Cancelled => vec![Line::from("Cancelled").yellow()],

        WizardState::EnvCreated { path } => vec![
            Line::from(format!("Created {}", path.display())).green().bold(),
            blank(),
            Line::from(format!("Edit {} and run reposync again.", ENV_FILE_NAME)),
        ],
    };

    Text::from(lines)
}

/// The syncing view with the latest [`MAX_PROGRESS_LINES`] progress lines
pub fn render_syncing(repos: &[RepoRef], progress: &[Line<'static>]) -> Text<'static> {
    let mut lines = vec![
        status(format!("Syncing {} repositories", repos.len())),
        blank(),
    ];
    let hidden = progress.len().saturating_sub(MAX_PROGRESS_LINES);
    if hidden > 0 {
        lines.push(hint(&format!("… {} earlier lines", hidden)));
    }
    lines.extend(progress[hidden..].iter().cloned());
    lines.push(blank());
    lines.push(hint(HINT_QUIT));
    Text::from(lines)
}

/// One progress line for the syncing view
pub fn progress_line(progress: &SyncProgress<'_>) -> Line<'static> {
    match progress {
        SyncProgress::Started {
            kind,
            repo,
            index,
            total,
        } => Line::from(format!("[{}/{}] {} → {}", index, total, kind.label(), repo)).cyan(),
        SyncProgress::Finished { result } => {
            let line = Line::from(format!("    {}", summary_line(result)));
            if result.success { line.green() } else { line.red() }
        }
    }
}

fn render_summary(summary: &SyncSummary) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from("=== Sync results ===").bold(), blank()];
    for detail in &summary.details {
        let line = Line::from(detail.clone());
        lines.push(if detail.starts_with(crate::sync::SUCCESS_MARK) {
            line.green()
        } else {
            line.red()
        });
    }
    lines.push(blank());
    lines.push(
        Line::from(format!(
            "Total: {}/{} succeeded",
            summary.success_count, summary.total_repos
        ))
        .bold(),
    );
    if summary.fail_count > 0 {
        lines.push(Line::from(format!("{} failed", summary.fail_count)).red());
    }
    lines.push(blank());
    lines.push(Line::from("=== Done ===").green().bold());
    lines
}

/// Flatten text to plain lines, dropping all styling
pub fn plain_text(text: &Text<'_>) -> String {
    text.lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
