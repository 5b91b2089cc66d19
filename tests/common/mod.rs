//! Shared test helpers: a `CommandRunner` stub standing in for `git` and `gh`

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use reposync::{CommandOutput, CommandRunner};
use tempfile::TempDir;

/// One recorded invocation
#[derive(Debug, Clone)]
pub struct Call {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Call {
    pub fn line(&self) -> String {
        format!("{} {}", self.program, self.args.join(" "))
    }
}

/// Records every call and answers like a healthy `git`/`gh` pair.
///
/// `git clone` creates the destination directory so files can be copied
/// into it; `git status --porcelain` reports changes unless told otherwise.
pub struct RecordingRunner {
    pub calls: RefCell<Vec<Call>>,
    pub failing_clones: HashSet<String>,
    pub dirty: bool,
    /// Every `git push` is rejected
    pub failing_push: bool,
    pub gh_authenticated: bool,
    pub gh_repo_list: String,
}

impl Default for RecordingRunner {
    fn default() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            failing_clones: HashSet::new(),
            dirty: true,
            failing_push: false,
            gh_authenticated: true,
            gh_repo_list: String::new(),
        }
    }
}

impl RecordingRunner {
    pub fn failing_clone(mut self, full_name: &str) -> Self {
        self.failing_clones.insert(format!("https://github.com/{}.git", full_name));
        self
    }

    pub fn lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(Call::line).collect()
    }

    /// Destination directories passed to `git clone`, in call order
    pub fn clone_dests(&self) -> Vec<PathBuf> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.program == "git" && c.args.first().map(String::as_str) == Some("clone"))
            .map(|c| PathBuf::from(&c.args[2]))
            .collect()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.lines().iter().filter(|l| l.starts_with(prefix)).count()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> io::Result<CommandOutput> {
        self.calls.borrow_mut().push(Call {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            cwd: cwd.map(Path::to_path_buf),
        });

        let output = match (program, args) {
            ("git", ["clone", url, dest]) => {
                if self.failing_clones.contains(*url) {
                    CommandOutput::failed(format!("fatal: repository '{}' not found", url))
                } else {
                    fs::create_dir_all(dest)?;
                    CommandOutput::ok("")
                }
            }
            ("git", ["status", "--porcelain"]) if self.dirty => CommandOutput::ok(" M file\n"),
            ("git", ["push", ..]) if self.failing_push => {
                CommandOutput::failed("! [remote rejected] main -> main (protected branch hook declined)")
            }
            ("git", _) => CommandOutput::ok(""),
            ("gh", ["--version"]) => CommandOutput::ok("gh version 2.60.0"),
            ("gh", ["auth", "status"]) if self.gh_authenticated => CommandOutput::ok("Logged in"),
            ("gh", ["auth", "status"]) => CommandOutput::failed("You are not logged into any GitHub hosts"),
            ("gh", ["repo", "list", ..]) => CommandOutput::ok(self.gh_repo_list.clone()),
            _ => CommandOutput::failed("unexpected command"),
        };
        Ok(output)
    }
}

/// Project root with a `.env` and the given files (relative path, contents)
pub fn project(env: Option<&str>, files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    if let Some(env) = env {
        fs::write(dir.path().join(".env"), env).unwrap();
    }
    for (path, contents) in files {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, contents).unwrap();
    }
    dir
}

/// Make sure both source directories exist, even when empty
pub fn ensure_source_dirs(root: &Path) {
    fs::create_dir_all(root.join(".github/workflows")).unwrap();
    fs::create_dir_all(root.join(".claude/agents")).unwrap();
}
