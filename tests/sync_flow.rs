//! End-to-end sync runs against a recording git stub

mod common;

use std::ops::ControlFlow;

use common::{RecordingRunner, ensure_source_dirs, project};
use reposync::{
    ArtifactKind, RepoRef, SyncOptions, SyncProgress, Syncer, get_sync_summary, sync_artifacts, sync_to_repos,
    sync_to_repos_with_progress,
};

#[test]
fn test_single_workflow_no_agents() {
    let dir = project(None, &[(".github/workflows/ci.yml", "name: CI\n")]);
    ensure_source_dirs(dir.path());
    let runner = RecordingRunner::default();
    let syncer = Syncer::new(&runner, dir.path());
    let repos = [RepoRef::new("acme/api")];

    let report = sync_to_repos(&syncer, &repos, SyncOptions::default());

    let workflows = report.results(ArtifactKind::Workflows).unwrap();
    assert_eq!(workflows.len(), 1);
    assert!(workflows[0].success);
    assert_eq!(workflows[0].synced, vec!["ci.yml".to_string()]);
    assert!(workflows[0].pushed);

    let agents = report.results(ArtifactKind::Agents).unwrap();
    assert_eq!(agents.len(), 1);
    assert!(agents[0].success);
    assert!(agents[0].synced.is_empty());
    assert!(!agents[0].pushed);

    // Only the workflow attempt touched git
    assert_eq!(runner.count("git clone"), 1);
    assert_eq!(runner.count("git commit"), 1);
    assert_eq!(runner.count("git push origin main"), 1);

    let lines = runner.lines();
    assert!(lines.contains(&"git add .github/workflows/".to_string()));
    assert!(lines.contains(&"git config user.name Claude Code".to_string()));

    let summary = get_sync_summary(&report);
    assert_eq!(summary.total_repos, 2);
    assert_eq!(summary.success_count, 2);
    assert_eq!(summary.details[0], "✓ acme/api: Workflows (1 files)");
    assert_eq!(summary.details[1], "✓ acme/api: Agents (0 files)");
}

#[test]
fn test_clone_failure_is_isolated() {
    let dir = project(
        None,
        &[
            (".github/workflows/ci.yml", "name: CI\n"),
            (".claude/agents/reviewer.md", "# Reviewer\n"),
        ],
    );
    let runner = RecordingRunner::default().failing_clone("acme/missing");
    let syncer = Syncer::new(&runner, dir.path());
    let repos = [RepoRef::new("acme/missing"), RepoRef::new("acme/api")];

    let report = sync_to_repos(&syncer, &repos, SyncOptions::default());

    for kind in ArtifactKind::ALL {
        let results = report.results(kind).unwrap();
        assert_eq!(results.len(), 2);

        assert!(!results[0].success);
        assert!(results[0].synced.is_empty());
        assert!(results[0].error.as_deref().unwrap().contains("not found"));

        assert!(results[1].success);
        assert!(results[1].pushed);
    }

    // Every temporary clone is gone, failed or not
    let dests = runner.clone_dests();
    assert_eq!(dests.len(), 4);
    for dest in dests {
        assert!(!dest.parent().unwrap().exists(), "{} left behind", dest.display());
    }

    let summary = get_sync_summary(&report);
    assert_eq!(summary.success_count, 2);
    assert_eq!(summary.fail_count, 2);
}

#[test]
fn test_unchanged_clone_skips_commit() {
    let dir = project(None, &[(".claude/agents/team/reviewer.md", "# Reviewer\n")]);
    let runner = RecordingRunner {
        dirty: false,
        ..Default::default()
    };

    let result = sync_artifacts(&runner, dir.path(), &RepoRef::new("acme/api"), ArtifactKind::Agents);

    assert!(result.success);
    assert_eq!(result.synced, vec!["team/reviewer.md".to_string()]);
    assert!(!result.pushed);
    assert_eq!(runner.count("git commit"), 0);
    assert_eq!(runner.count("git push"), 0);
}

#[test]
fn test_disabled_kind_is_not_run() {
    let dir = project(None, &[(".github/workflows/ci.yml", "name: CI\n")]);
    let runner = RecordingRunner::default();
    let syncer = Syncer::new(&runner, dir.path());
    let options = SyncOptions::default().toggled(ArtifactKind::Agents);

    let report = sync_to_repos(&syncer, &[RepoRef::new("acme/api")], options);

    assert!(report.results(ArtifactKind::Agents).is_none());
    assert_eq!(report.results(ArtifactKind::Workflows).unwrap().len(), 1);
}

#[test]
fn test_missing_source_dir_fails_without_clone() {
    let dir = project(None, &[]);
    let runner = RecordingRunner::default();

    let result = sync_artifacts(&runner, dir.path(), &RepoRef::new("acme/api"), ArtifactKind::Workflows);

    assert!(!result.success);
    assert!(result.error.unwrap().contains("not found"));
    assert!(runner.lines().is_empty());
}

#[test]
fn test_rejected_push_reports_failure_and_cleans_up() {
    let dir = project(None, &[(".github/workflows/ci.yml", "name: CI\n")]);
    let runner = RecordingRunner {
        failing_push: true,
        ..Default::default()
    };

    let result = sync_artifacts(&runner, dir.path(), &RepoRef::new("acme/api"), ArtifactKind::Workflows);

    assert!(!result.success);
    assert!(result.synced.is_empty());
    assert!(!result.pushed);
    assert!(result.error.as_deref().unwrap().contains("remote rejected"));

    // main, then the HEAD fallback, then give up
    assert_eq!(runner.count("git push origin main"), 1);
    assert_eq!(runner.count("git push origin HEAD"), 1);
    assert_eq!(runner.count("git push"), 2);

    let dests = runner.clone_dests();
    assert_eq!(dests.len(), 1);
    assert!(!dests[0].parent().unwrap().exists());
}

#[test]
fn test_stopping_progress_skips_remaining_attempts() {
    let dir = project(
        None,
        &[
            (".github/workflows/ci.yml", "name: CI\n"),
            (".claude/agents/reviewer.md", "# Reviewer\n"),
        ],
    );
    let runner = RecordingRunner::default();
    let syncer = Syncer::new(&runner, dir.path());
    let repos = [RepoRef::new("acme/api"), RepoRef::new("acme/web")];

    let report = sync_to_repos_with_progress(&syncer, &repos, SyncOptions::default(), |event| match event {
        SyncProgress::Finished { .. } => ControlFlow::Break(()),
        SyncProgress::Started { .. } => ControlFlow::Continue(()),
    });

    assert!(report.interrupted);
    assert_eq!(runner.count("git clone"), 1);
    assert_eq!(report.results(ArtifactKind::Workflows).unwrap().len(), 1);
    assert!(report.results(ArtifactKind::Agents).is_none());
}
