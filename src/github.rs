//! GitHub repository discovery through the `gh` CLI

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::error::{Result, SyncError};
use crate::process::CommandRunner;

/// Upper bound on repositories fetched for one organization
pub const REPO_LIST_LIMIT: usize = 1000;

const GITHUB_BASE_URL: &str = "https://github.com";

static REPO_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").unwrap());

static OWNER_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap());

/// A target repository, identified by its `owner/name` full name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    full_name: String,
}

impl RepoRef {
    /// Wrap a full name without validation (names reported by `gh` or `.env`)
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
        }
    }

    /// Parse a name typed by the user, which must look like `owner/name`
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        REPO_NAME_RE.is_match(input).then(|| Self::new(input))
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// URL handed to `git clone`
    pub fn clone_url(&self) -> String {
        format!("{}/{}.git", GITHUB_BASE_URL, self.full_name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

/// Whether `input` is a plausible organization or user name
pub fn is_valid_owner(input: &str) -> bool {
    OWNER_NAME_RE.is_match(input.trim())
}

/// Check a full name against the exclusion list.
///
/// Entries may be bare (`name`) or qualified (`org/name`); comparison is
/// case-sensitive.
pub fn is_excluded(org: &str, full_name: &str, excluded: &[String]) -> bool {
    excluded.iter().any(|entry| {
        let entry = entry.trim();
        full_name == format!("{}/{}", org, entry) || full_name == entry
    })
}

/// Parse `gh repo list` output into repositories, dropping excluded ones.
///
/// Each line is tab-separated and starts with the repository name. Newer
/// `gh` versions print it as `org/name`; older ones print the bare name.
pub fn parse_repo_list(org: &str, stdout: &str, excluded: &[String]) -> Vec<RepoRef> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| line.split('\t').next().map(str::trim))
        .filter(|name| !name.is_empty())
        .map(|name| {
            if name.contains('/') {
                name.to_string()
            } else {
                format!("{}/{}", org, name)
            }
        })
        .filter(|full_name| !is_excluded(org, full_name, excluded))
        .map(RepoRef::new)
        .collect()
}

/// Thin wrapper over the `gh` command-line tool
pub struct GitHub<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
}

impl<'a, R: CommandRunner + ?Sized> GitHub<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    pub fn is_installed(&self) -> bool {
        matches!(self.runner.run("gh", &["--version"], None), Ok(out) if out.success)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.runner.run("gh", &["auth", "status"], None), Ok(out) if out.success)
    }

    /// Verify `gh` is installed and logged in. Runs before any listing or sync.
    pub fn perform_checks(&self) -> Result<()> {
        if !self.is_installed() {
            return Err(SyncError::GitHub(
                "gh is not installed. Install it from https://cli.github.com/".to_string(),
            ));
        }

        if !self.is_authenticated() {
            return Err(SyncError::Authentication(
                "Not logged in to GitHub. Run `gh auth login` first".to_string(),
            ));
        }

        tracing::debug!("gh is installed and authenticated");
        Ok(())
    }

    /// List the repositories of `org`, minus the exclusion list.
    pub fn list_org_repos(&self, org: &str, excluded: &[String]) -> Result<Vec<RepoRef>> {
        let limit = REPO_LIST_LIMIT.to_string();
        let output = self
            .runner
            .run("gh", &["repo", "list", org, "--limit", limit.as_str()], None)
            .map_err(|e| SyncError::GitHub(format!("Failed to list repositories: {}", e)))?;

        if !output.success {
            return Err(SyncError::GitHub(format!(
                "Failed to list repositories: {}",
                output.failure_reason()
            )));
        }

        let repos = parse_repo_list(org, &output.stdout, excluded);
        tracing::info!(org, count = repos.len(), "Fetched organization repositories");
        Ok(repos)
    }
}

/// Verify the `gh` tooling; see [`GitHub::perform_checks`].
pub fn perform_github_checks<R: CommandRunner + ?Sized>(runner: &R) -> Result<()> {
    GitHub::new(runner).perform_checks()
}

/// List organization repositories; see [`GitHub::list_org_repos`].
pub fn get_org_repos<R: CommandRunner + ?Sized>(
    runner: &R,
    org: &str,
    excluded: &[String],
) -> Result<Vec<RepoRef>> {
    GitHub::new(runner).list_org_repos(org, excluded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::CommandOutput;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io;
    use std::path::Path;

    /// Answers `gh` calls from a table keyed by the joined arguments
    #[derive(Default)]
    struct FakeGh {
        responses: HashMap<String, CommandOutput>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeGh {
        fn respond(mut self, args: &str, output: CommandOutput) -> Self {
            self.responses.insert(args.to_string(), output);
            self
        }
    }

    impl CommandRunner for FakeGh {
        fn run(&self, program: &str, args: &[&str], _cwd: Option<&Path>) -> io::Result<CommandOutput> {
            assert_eq!(program, "gh");
            let key = args.join(" ");
            self.calls.borrow_mut().push(key.clone());
            self.responses
                .get(&key)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "gh: not found"))
        }
    }

    fn excluded(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_repo_list_applies_exclusions() {
        let stdout = "acme/api\tThe API\tpublic\t2024-01-01\n\
                      acme/legacy\told stuff\tprivate\n\
                      web\tfrontend\n\
                      \n\
                      acme/archive\t\n";
        let repos = parse_repo_list("acme", stdout, &excluded(&["legacy", "acme/archive"]));
        let names: Vec<_> = repos.iter().map(|r| r.full_name()).collect();
        assert_eq!(names, vec!["acme/api", "acme/web"]);
    }

    #[test]
    fn test_excluded_entries_never_returned() {
        let stdout = "one\ntwo\nthree\nfour\n";
        for entry in ["one", "acme/two", " three "] {
            let list = excluded(&[entry]);
            let repos = parse_repo_list("acme", stdout, &list);
            let target = format!("acme/{}", entry.trim().trim_start_matches("acme/"));
            assert!(repos.iter().all(|r| r.full_name() != target), "{entry}");
            assert_eq!(repos.len(), 3);
        }
    }

    #[test]
    fn test_exclusion_is_case_sensitive() {
        assert!(!is_excluded("acme", "acme/API", &excluded(&["api"])));
        assert!(is_excluded("acme", "acme/api", &excluded(&["api"])));
        assert!(!is_excluded("acme", "acme/api", &excluded(&["other/api"])));
    }

    #[test]
    fn test_repo_ref_parse() {
        assert_eq!(
            RepoRef::parse(" acme/my_repo.rs "),
            Some(RepoRef::new("acme/my_repo.rs"))
        );
        assert!(RepoRef::parse("acme").is_none());
        assert!(RepoRef::parse("acme/a/b").is_none());
        assert!(RepoRef::parse("acme/has space").is_none());
        assert!(RepoRef::parse("").is_none());
        assert!(is_valid_owner("Sunwood-ai-labs"));
        assert!(!is_valid_owner("a/b"));
    }

    #[test]
    fn test_clone_url() {
        assert_eq!(
            RepoRef::new("acme/api").clone_url(),
            "https://github.com/acme/api.git"
        );
    }

    #[test]
    fn test_checks_missing_gh() {
        let gh = FakeGh::default();
        let err = perform_github_checks(&gh).unwrap_err();
        assert!(matches!(err, SyncError::GitHub(_)));
        // Auth is not queried when gh is missing
        assert_eq!(*gh.calls.borrow(), vec!["--version"]);
    }

    #[test]
    fn test_checks_not_authenticated() {
        let gh = FakeGh::default()
            .respond("--version", CommandOutput::ok("gh version 2.40.0"))
            .respond("auth status", CommandOutput::failed("You are not logged in"));
        let err = perform_github_checks(&gh).unwrap_err();
        assert!(matches!(err, SyncError::Authentication(_)));
        assert_eq!(err.code(), "AUTH_ERROR");
    }

    #[test]
    fn test_checks_pass() {
        let gh = FakeGh::default()
            .respond("--version", CommandOutput::ok("gh version 2.40.0"))
            .respond("auth status", CommandOutput::ok("Logged in"));
        assert!(perform_github_checks(&gh).is_ok());
    }

    #[test]
    fn test_get_org_repos_uses_limit() {
        let gh = FakeGh::default().respond(
            "repo list acme --limit 1000",
            CommandOutput::ok("acme/api\tdesc\nacme/sandbox\tdesc\n"),
        );
        let repos = get_org_repos(&gh, "acme", &excluded(&["sandbox"])).unwrap();
        assert_eq!(repos, vec![RepoRef::new("acme/api")]);
    }

    #[test]
    fn test_get_org_repos_failure() {
        let gh = FakeGh::default().respond(
            "repo list ghost --limit 1000",
            CommandOutput::failed("Could not resolve to an Organization"),
        );
        let err = get_org_repos(&gh, "ghost", &[]).unwrap_err();
        assert!(matches!(err, SyncError::GitHub(_)));
        assert!(err.to_string().contains("Could not resolve"));
    }
}
