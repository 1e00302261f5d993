//! Repository file locator.
//!
//! Resolves a file referenced by an SCM-backed pipeline (repository URL plus
//! relative script path) against a local directory of cloned repositories.
//! Most deployments only have a subset of repositories cloned, so a miss is
//! an expected outcome, not an error.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Locates files inside locally cloned repositories.
#[derive(Debug, Clone, Default)]
pub struct RepoFileLocator {
    root: Option<PathBuf>,
}

impl RepoFileLocator {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// True if a clone root is configured and exists on disk.
    pub fn is_available(&self) -> bool {
        self.root.as_deref().is_some_and(Path::exists)
    }

    /// Derive the candidate clone directory name from a repository URL:
    /// the final path segment with a trailing `.git` stripped.
    pub fn repo_dir_name(repo_url: &str) -> Option<String> {
        let name = repo_url
            .trim_end_matches('/')
            .rsplit('/')
            .next()?
            .trim_end_matches(".git");
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }

    /// Read the file at `relative_path` inside the clone of `repo_url`.
    ///
    /// Probes `{root}/{name}/{path}` then `{root}/{lowercase(name)}/{path}`
    /// and returns the first readable candidate, decoded lossily. Returns
    /// `None` when the root is unset or missing, the repository is not cloned
    /// locally, or the file does not exist.
    pub fn read(&self, repo_url: &str, relative_path: &str) -> Option<String> {
        let root = self.root.as_deref()?;
        if !root.exists() {
            debug!(root = %root.display(), "Clone root does not exist");
            return None;
        }

        let name = Self::repo_dir_name(repo_url)?;
        let candidates = [
            root.join(&name).join(relative_path),
            root.join(name.to_lowercase()).join(relative_path),
        ];

        for candidate in &candidates {
            if !candidate.exists() {
                continue;
            }
            match std::fs::read(candidate) {
                Ok(bytes) => {
                    debug!(path = %candidate.display(), "Resolved script from local clone");
                    return Some(String::from_utf8_lossy(&bytes).into_owned());
                }
                Err(e) => {
                    warn!(path = %candidate.display(), error = %e, "Failed to read script candidate");
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_repo_dir_name_strips_git_suffix() {
        assert_eq!(
            RepoFileLocator::repo_dir_name("https://git.example.com/team/repo.git"),
            Some("repo".to_string())
        );
        assert_eq!(
            RepoFileLocator::repo_dir_name("https://git.example.com/team/repo"),
            Some("repo".to_string())
        );
        assert_eq!(
            RepoFileLocator::repo_dir_name("https://git.example.com/team/repo/"),
            Some("repo".to_string())
        );
    }

    #[test]
    fn test_read_from_exact_name() {
        let root = TempDir::new().unwrap();
        let repo = root.path().join("payments-service");
        fs::create_dir_all(&repo).unwrap();
        fs::write(repo.join("Jenkinsfile"), "pipeline {}").unwrap();

        let locator = RepoFileLocator::new(Some(root.path().to_path_buf()));
        let content = locator.read("https://git.example.com/t/payments-service.git", "Jenkinsfile");
        assert_eq!(content.as_deref(), Some("pipeline {}"));
    }

    #[test]
    fn test_read_falls_back_to_lowercase_name() {
        let root = TempDir::new().unwrap();
        let repo = root.path().join("payments-service");
        fs::create_dir_all(&repo).unwrap();
        fs::write(repo.join("Jenkinsfile"), "lowercase hit").unwrap();

        let locator = RepoFileLocator::new(Some(root.path().to_path_buf()));
        let content = locator.read("https://git.example.com/t/Payments-Service.git", "Jenkinsfile");
        assert_eq!(content.as_deref(), Some("lowercase hit"));
    }

    #[test]
    fn test_read_nested_script_path() {
        let root = TempDir::new().unwrap();
        let ci_dir = root.path().join("repo").join("ci");
        fs::create_dir_all(&ci_dir).unwrap();
        fs::write(ci_dir.join("Jenkinsfile"), "nested").unwrap();

        let locator = RepoFileLocator::new(Some(root.path().to_path_buf()));
        let content = locator.read("https://git.example.com/t/repo.git", "ci/Jenkinsfile");
        assert_eq!(content.as_deref(), Some("nested"));
    }

    #[test]
    fn test_missing_repo_is_not_found() {
        let root = TempDir::new().unwrap();
        let locator = RepoFileLocator::new(Some(root.path().to_path_buf()));
        assert!(
            locator
                .read("https://git.example.com/t/absent.git", "Jenkinsfile")
                .is_none()
        );
    }

    #[test]
    fn test_unset_root_is_not_found() {
        let locator = RepoFileLocator::new(None);
        assert!(!locator.is_available());
        assert!(
            locator
                .read("https://git.example.com/t/repo.git", "Jenkinsfile")
                .is_none()
        );
    }

    #[test]
    fn test_nonexistent_root_is_not_found() {
        let locator = RepoFileLocator::new(Some(PathBuf::from("/definitely/not/here")));
        assert!(!locator.is_available());
        assert!(
            locator
                .read("https://git.example.com/t/repo.git", "Jenkinsfile")
                .is_none()
        );
    }

    #[test]
    fn test_read_decodes_lossily() {
        let root = TempDir::new().unwrap();
        let repo = root.path().join("repo");
        fs::create_dir_all(&repo).unwrap();
        fs::write(repo.join("Jenkinsfile"), b"echo \xff${P}").unwrap();

        let locator = RepoFileLocator::new(Some(root.path().to_path_buf()));
        let content = locator
            .read("https://git.example.com/t/repo.git", "Jenkinsfile")
            .unwrap();
        assert!(content.contains("${P}"));
    }
}
