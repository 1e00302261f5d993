//! Reconciliation of job-level and repository-level findings.
//!
//! Correlation between a job and a repository is a symmetric,
//! case-insensitive substring test. Deliberately permissive; short names can
//! over-match.

use crate::repo_scan::RepoMatch;
use crate::resolver::ProvenanceRecord;
use serde::{Deserialize, Serialize};

/// Derived cross-source sets. Pure output; owns no state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Jobs with positive evidence but no name-correlated repository match.
    pub orphan_jobs: Vec<String>,
    /// Repositories with parameter evidence but no name-correlated job.
    pub orphan_repos: Vec<String>,
}

/// True if either normalized name contains the other.
pub fn names_correlate(job_name: &str, repo_name: &str) -> bool {
    let job = job_name.to_lowercase();
    let repo = repo_name.to_lowercase();
    job.contains(&repo) || repo.contains(&job)
}

/// Cross-reference resolved records against standalone repository matches.
/// Only records with `found == true` participate; a job with no evidence has
/// nothing to correlate.
pub fn reconcile(records: &[ProvenanceRecord], repo_matches: &[RepoMatch]) -> Reconciliation {
    let mut reconciliation = Reconciliation::default();

    for record in records.iter().filter(|r| r.found) {
        let matched = repo_matches
            .iter()
            .any(|repo| names_correlate(&record.job_name, &repo.repo_name));
        if !matched {
            reconciliation.orphan_jobs.push(record.job_name.clone());
        }
    }

    for repo in repo_matches {
        let matched = records
            .iter()
            .filter(|r| r.found)
            .any(|record| names_correlate(&record.job_name, &repo.repo_name));
        if !matched {
            reconciliation.orphan_repos.push(repo.repo_name.clone());
        }
    }

    reconciliation
}
