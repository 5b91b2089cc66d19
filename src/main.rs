//! reposync CLI
//!
//! Interactive wizard that syncs workflows and agent definitions to GitHub
//! repositories.

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use is_terminal::IsTerminal;
use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use reposync::wizard;

#[derive(Parser)]
#[command(name = "reposync")]
#[command(
    author,
    version,
    about = "Sync GitHub Actions workflows and agent definitions to other repositories"
)]
struct Cli {
    /// Project root holding .env and the source files (default: current directory)
    #[arg(long, env = "REPOSYNC_PROJECT_ROOT")]
    project_root: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    // Usage errors exit 1 like every other failure; help and version exit 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_tracing();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let project_root = match cli.project_root {
        Some(path) => path,
        None => env::current_dir().context("Failed to determine the current directory")?,
    };

    if !project_root.is_dir() {
        bail!("Project root not found: {}", project_root.display());
    }

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        bail!("reposync is interactive and needs a terminal");
    }

    tracing::debug!(project_root = %project_root.display(), "Starting wizard");
    wizard::run_wizard(&project_root)
}
