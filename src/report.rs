//! Aggregate scan report consumed by the reporters.

use crate::reconcile::Reconciliation;
use crate::repo_scan::RepoMatch;
use crate::resolver::{ProvenanceRecord, Source};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Headline counts derived from the record list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total_jobs: usize,
    pub jobs_with_parameter: usize,
    /// Jobs where the parameter is declared (XML block or script).
    pub defined_as_parameter: usize,
    /// Jobs that reference the parameter without declaring it anywhere.
    pub used_only: usize,
    /// SCM-backed jobs whose Jenkinsfile could not be resolved locally.
    pub coverage_gaps: usize,
}

impl ScanSummary {
    pub fn from_records(records: &[ProvenanceRecord]) -> Self {
        let mut summary = Self {
            total_jobs: records.len(),
            ..Self::default()
        };

        for record in records {
            if record.found {
                summary.jobs_with_parameter += 1;
            }
            let defined = record.sources.iter().any(|s| {
                s.evidence
                    .as_ref()
                    .is_some_and(|e| e.defined_as_parameter)
            });
            if defined {
                summary.defined_as_parameter += 1;
            } else if record.found {
                summary.used_only += 1;
            }
            if record.source(Source::JenkinsfileNotFound).is_some() {
                summary.coverage_gaps += 1;
            }
        }

        summary
    }
}

/// Everything one scan produced for one parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub version: String,
    pub generated_at: String,
    pub jenkins_url: String,
    pub parameter: String,
    pub summary: ScanSummary,
    pub records: Vec<ProvenanceRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repo_matches: Vec<RepoMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciliation: Option<Reconciliation>,
}

impl ScanReport {
    pub fn new(jenkins_url: &str, parameter: &str, records: Vec<ProvenanceRecord>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now().to_rfc3339(),
            jenkins_url: jenkins_url.to_string(),
            parameter: parameter.to_string(),
            summary: ScanSummary::from_records(&records),
            records,
            repo_matches: Vec::new(),
            reconciliation: None,
        }
    }

    pub fn with_repo_matches(mut self, repo_matches: Vec<RepoMatch>) -> Self {
        self.reconciliation = Some(crate::reconcile::reconcile(&self.records, &repo_matches));
        self.repo_matches = repo_matches;
        self
    }
}
