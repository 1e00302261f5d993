//! Standalone repository scanner.
//!
//! Searches a filesystem tree of git clones for a parameter directly,
//! bypassing the Jenkins server. Produces the repository-side input to
//! reconciliation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// File patterns handed to `git grep`; pipeline definitions and build
/// scripts, where Jenkins parameters typically surface.
const GREP_PATHSPECS: &[&str] = &["Jenkinsfile*", "*.groovy", "*.gradle"];

/// Deadline for one `git grep` invocation. A repository on a dead mount or
/// with a wedged object store must not stall the whole scan.
const GREP_TIMEOUT: Duration = Duration::from_secs(30);

/// One matching line from `git grep`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrepMatch {
    pub file: String,
    pub line: usize,
    pub content: String,
}

/// All matches for one repository. Independent lifecycle from
/// [`crate::resolver::ProvenanceRecord`]; the two are joined only during
/// reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMatch {
    pub repo_name: String,
    pub repo_path: PathBuf,
    pub matches: Vec<GrepMatch>,
}

/// Scans every git repository under a root directory.
pub struct RepoScanner {
    root: PathBuf,
}

impl RepoScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Find git repositories under the root: any directory containing a
    /// `.git` entry. Does not descend into a repository once found.
    pub fn find_repositories(&self) -> Vec<PathBuf> {
        let mut repos = Vec::new();
        if !self.root.exists() {
            warn!(root = %self.root.display(), "Repository root does not exist");
            return repos;
        }

        let mut it = WalkDir::new(&self.root).into_iter();
        while let Some(entry) = it.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };
            if entry.file_type().is_dir() && entry.path().join(".git").exists() {
                repos.push(entry.path().to_path_buf());
                it.skip_current_dir();
            }
        }

        debug!(count = repos.len(), root = %self.root.display(), "Discovered repositories");
        repos
    }

    /// Grep every discovered repository for the parameter. Repositories
    /// without matches (or where `git grep` fails) are omitted.
    pub fn scan(&self, parameter: &str) -> Vec<RepoMatch> {
        let repos = self.find_repositories();
        let mut results = Vec::new();

        for repo in &repos {
            if let Some(result) = search_repository(repo, parameter) {
                debug!(repo = %result.repo_name, matches = result.matches.len(), "Parameter found");
                results.push(result);
            }
        }

        info!(
            parameter,
            repositories = repos.len(),
            with_matches = results.len(),
            "Repository scan complete"
        );
        results
    }
}

/// Run `git grep -n -i` for the parameter, restricted to pipeline file
/// patterns. Returns `None` when nothing matches or the repository cannot
/// be searched.
fn search_repository(repo_path: &Path, parameter: &str) -> Option<RepoMatch> {
    let mut cmd = Command::new("git");
    cmd.args(["grep", "-n", "-i", parameter, "--"])
        .args(GREP_PATHSPECS)
        .current_dir(repo_path);

    let output = match run_with_timeout(&mut cmd, GREP_TIMEOUT) {
        Ok(Some(output)) => output,
        Ok(None) => {
            warn!(
                repo = %repo_path.display(),
                timeout_secs = GREP_TIMEOUT.as_secs(),
                "git grep timed out; skipping repository"
            );
            return None;
        }
        Err(e) => {
            warn!(repo = %repo_path.display(), error = %e, "Failed to run git grep");
            return None;
        }
    };

    // Exit code 1 means no matches; anything above that is a repository
    // problem worth a warning.
    if !output.status.success() {
        if output.status.code() != Some(1) {
            warn!(
                repo = %repo_path.display(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "git grep failed"
            );
        }
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let matches: Vec<GrepMatch> = stdout.lines().filter_map(parse_grep_line).collect();
    if matches.is_empty() {
        return None;
    }

    Some(RepoMatch {
        repo_name: repo_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        repo_path: repo_path.to_path_buf(),
        matches,
    })
}

/// Run a command with a wall-clock deadline. Returns `Ok(None)` when the
/// deadline expires; the child is killed and reaped before returning.
fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> std::io::Result<Option<Output>> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd.spawn()?;

    let deadline = Instant::now() + timeout;
    loop {
        if child.try_wait()?.is_some() {
            return child.wait_with_output().map(Some);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        std::thread::sleep(Duration::from_millis(25));
    }
}

/// Parse one `file:line:content` row from `git grep -n` output.
fn parse_grep_line(line: &str) -> Option<GrepMatch> {
    let mut parts = line.splitn(3, ':');
    let file = parts.next()?;
    let line_no = parts.next()?.parse().ok()?;
    let content = parts.next()?;
    Some(GrepMatch {
        file: file.to_string(),
        line: line_no,
        content: content.trim().to_string(),
    })
}
