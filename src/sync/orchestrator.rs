//! Sync orchestration and result summaries

use std::ops::ControlFlow;

use super::{SyncResult, Syncer};
use crate::artifact::ArtifactKind;
use crate::config::SyncOptions;
use crate::github::RepoRef;
use crate::process::CommandRunner;

/// Marker prefixed to successful summary lines
pub const SUCCESS_MARK: &str = "✓";

/// Marker prefixed to failed summary lines
pub const FAILURE_MARK: &str = "✗";

/// Results of a run, grouped by kind; `None` for kinds that were not enabled
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub workflows: Option<Vec<SyncResult>>,
    pub agents: Option<Vec<SyncResult>>,
    /// Set when the progress callback stopped the run early
    pub interrupted: bool,
}

impl SyncReport {
    pub fn results(&self, kind: ArtifactKind) -> Option<&[SyncResult]> {
        match kind {
            ArtifactKind::Workflows => self.workflows.as_deref(),
            ArtifactKind::Agents => self.agents.as_deref(),
        }
    }

    fn set_results(&mut self, kind: ArtifactKind, results: Vec<SyncResult>) {
        match kind {
            ArtifactKind::Workflows => self.workflows = Some(results),
            ArtifactKind::Agents => self.agents = Some(results),
        }
    }

    /// Every result, workflows first
    pub fn iter(&self) -> impl Iterator<Item = &SyncResult> {
        ArtifactKind::ALL
            .into_iter()
            .filter_map(|kind| self.results(kind))
            .flatten()
    }
}

/// Progress notifications emitted while a run is in flight
#[derive(Debug, Clone, Copy)]
pub enum SyncProgress<'a> {
    Started {
        kind: ArtifactKind,
        repo: &'a RepoRef,
        /// 1-based position among all attempts of the run
        index: usize,
        total: usize,
    },
    Finished {
        result: &'a SyncResult,
    },
}

/// Run every enabled kind against every repository; see
/// [`sync_to_repos_with_progress`].
pub fn sync_to_repos<R: CommandRunner + ?Sized>(
    syncer: &Syncer<'_, R>,
    repos: &[RepoRef],
    options: SyncOptions,
) -> SyncReport {
    sync_to_repos_with_progress(syncer, repos, options, |_| ControlFlow::Continue(()))
}

/// Run every enabled kind (workflows, then agents) against each repository
/// in order. A failed attempt never stops the remaining ones.
///
/// `on_progress` may return `ControlFlow::Break` to skip every attempt that
/// has not started yet; the report then holds what finished and is marked
/// `interrupted`.
pub fn sync_to_repos_with_progress<R, F>(
    syncer: &Syncer<'_, R>,
    repos: &[RepoRef],
    options: SyncOptions,
    mut on_progress: F,
) -> SyncReport
where
    R: CommandRunner + ?Sized,
    F: FnMut(SyncProgress<'_>) -> ControlFlow<()>,
{
    let kinds = options.enabled_kinds();
    let total = kinds.len() * repos.len();
    let mut report = SyncReport::default();
    let mut index = 0;

    'kinds: for kind in kinds {
        let mut results = Vec::with_capacity(repos.len());
        for repo in repos {
            index += 1;
            let started = SyncProgress::Started {
                kind,
                repo,
                index,
                total,
            };
            if on_progress(started).is_break() {
                report.interrupted = true;
            } else {
                let result = syncer.sync_artifacts(kind, repo);
                let flow = on_progress(SyncProgress::Finished { result: &result });
                results.push(result);
                report.interrupted = flow.is_break();
            }
            if report.interrupted {
                report.set_results(kind, results);
                break 'kinds;
            }
        }
        report.set_results(kind, results);
    }

    if report.interrupted {
        tracing::info!(attempted = report.iter().count(), total, "Sync interrupted");
    }
    report
}

/// Aggregate counts and per-result lines of a finished run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub total_repos: usize,
    pub success_count: usize,
    pub fail_count: usize,
    pub details: Vec<String>,
}

impl SyncSummary {
    pub fn all_succeeded(&self) -> bool {
        self.fail_count == 0
    }
}

/// One human-readable line for a result
pub fn summary_line(result: &SyncResult) -> String {
    if result.success {
        format!(
            "{} {}: {} ({} files)",
            SUCCESS_MARK,
            result.repo,
            result.kind.label(),
            result.synced.len()
        )
    } else {
        format!(
            "{} {}: {}",
            FAILURE_MARK,
            result.repo,
            result.error.as_deref().unwrap_or("Failed")
        )
    }
}

pub fn get_sync_summary(report: &SyncReport) -> SyncSummary {
    let mut summary = SyncSummary::default();

    for result in report.iter() {
        summary.total_repos += 1;
        if result.success {
            summary.success_count += 1;
        } else {
            summary.fail_count += 1;
        }
        summary.details.push(summary_line(result));
    }

    summary
}
