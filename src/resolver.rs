//! Parameter provenance resolver.
//!
//! Drives the classifier, matcher, and repository file locator against each
//! job's configuration and assembles one provenance record per leaf job. All
//! applicable sources are checked independently (never short-circuited) so a
//! parameter can be flagged under several sources at once.

use crate::classifier::{self, PipelineKind, ScriptSource};
use crate::error::Result;
use crate::jenkins::{ConfigFetcher, JobRef};
use crate::locator::RepoFileLocator;
use crate::matcher::{ParameterEvidence, TextMatcher};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Where evidence for a parameter was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    JobParameters,
    InlineScript,
    ScmJenkinsfile,
    XmlFallback,
    JenkinsfileNotFound,
    RepoGrep,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::JobParameters => "job_parameters",
            Source::InlineScript => "inline_script",
            Source::ScmJenkinsfile => "scm_jenkinsfile",
            Source::XmlFallback => "xml_fallback",
            Source::JenkinsfileNotFound => "jenkinsfile_not_found",
            Source::RepoGrep => "repo_grep",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One source checked for a job, with either match evidence or a note
/// (currently only used by `jenkinsfile_not_found` coverage gaps).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFinding {
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<ParameterEvidence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl SourceFinding {
    pub fn evidence(source: Source, evidence: ParameterEvidence) -> Self {
        Self {
            source,
            evidence: Some(evidence),
            note: None,
        }
    }

    pub fn note(source: Source, note: String) -> Self {
        Self {
            source,
            evidence: None,
            note: Some(note),
        }
    }

    pub fn is_positive(&self) -> bool {
        self.evidence.as_ref().is_some_and(|e| e.is_positive())
    }
}

/// The resolved evidence trail for one job. Immutable once appended to
/// resolver output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    pub job_name: String,
    pub job_url: String,
    pub job_type: PipelineKind,
    pub found: bool,
    pub sources: Vec<SourceFinding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_path: Option<String>,
}

impl ProvenanceRecord {
    fn empty(job: &JobRef) -> Self {
        Self {
            job_name: job.name.clone(),
            job_url: job.url.clone(),
            job_type: PipelineKind::Unknown,
            found: false,
            sources: Vec::new(),
            repo_url: None,
            script_path: None,
        }
    }

    /// Evidence attached under the given source, if any.
    pub fn source(&self, source: Source) -> Option<&SourceFinding> {
        self.sources.iter().find(|s| s.source == source)
    }
}

/// Shared cancellation flag. Flipping it stops the resolver from issuing new
/// fetches; records already collected are still returned.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Resolves parameter provenance for jobs, one at a time.
pub struct ParameterResolver<'a> {
    fetcher: &'a dyn ConfigFetcher,
    locator: RepoFileLocator,
    matcher: TextMatcher,
    /// Extracts the concrete Jenkins parameter-definition class surrounding
    /// a `<name>` tag in the XML parameter block.
    xml_kind_pattern: Regex,
    name_tag: String,
    export_dir: Option<PathBuf>,
    cancel: CancelFlag,
}

impl<'a> ParameterResolver<'a> {
    pub fn new(fetcher: &'a dyn ConfigFetcher, parameter: &str) -> Result<Self> {
        let name = regex::escape(parameter);
        let xml_kind_pattern = Regex::new(&format!(
            r"(?s)<(hudson\.model\.\w+ParameterDefinition)>.*?<name>{name}</name>"
        ))?;
        Ok(Self {
            fetcher,
            locator: RepoFileLocator::default(),
            matcher: TextMatcher::new(parameter)?,
            xml_kind_pattern,
            name_tag: format!("<name>{parameter}</name>"),
            export_dir: None,
            cancel: CancelFlag::new(),
        })
    }

    pub fn with_locator(mut self, locator: RepoFileLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Persist each fetched config under this directory as
    /// `{job_name_with_separators_replaced}.xml`.
    pub fn with_export_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.export_dir = dir;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn parameter(&self) -> &str {
        self.matcher.parameter()
    }

    /// Resolve every job in discovery order. Stops issuing fetches once the
    /// cancel flag is set and returns whatever was collected so far.
    pub fn resolve_all(&self, jobs: &[JobRef]) -> Vec<ProvenanceRecord> {
        let mut records = Vec::with_capacity(jobs.len());
        for (idx, job) in jobs.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(
                    resolved = records.len(),
                    remaining = jobs.len() - idx,
                    "Interrupted; returning partial results"
                );
                break;
            }
            debug!(job = %job.name, index = idx + 1, total = jobs.len(), "Resolving job");
            records.push(self.resolve_job(job));
        }
        info!(
            parameter = self.parameter(),
            jobs = records.len(),
            found = records.iter().filter(|r| r.found).count(),
            "Resolution pass complete"
        );
        records
    }

    /// Resolve one job into exactly one provenance record. Fetch and parse
    /// failures degrade the record; they never propagate.
    pub fn resolve_job(&self, job: &JobRef) -> ProvenanceRecord {
        let mut record = ProvenanceRecord::empty(job);

        // The only early exit: without a config there is nothing to inspect.
        let Some(config_xml) = self.fetcher.fetch_config(&job.url) else {
            return record;
        };

        self.export_config(&job.name, &config_xml);

        let descriptor = classifier::classify(&config_xml);
        record.job_type = descriptor.kind;

        // Structural XML parameter block check. Job-parameter definitions use
        // a fixed XML shape, so this is a literal tag containment test rather
        // than the matcher's script-declaration patterns.
        if config_xml.contains(&self.name_tag) {
            let kind = self
                .xml_kind_pattern
                .captures(&config_xml)
                .map(|caps| caps[1].to_string());
            record.sources.push(SourceFinding::evidence(
                Source::JobParameters,
                ParameterEvidence::defined(kind),
            ));
        }

        match descriptor.script_source {
            ScriptSource::Inline => {
                if let Some(script) = descriptor.inline_script.as_deref() {
                    let evidence = self.matcher.evidence(script);
                    if evidence.is_positive() {
                        record
                            .sources
                            .push(SourceFinding::evidence(Source::InlineScript, evidence));
                    }
                }
            }
            ScriptSource::Scm => {
                if let Some(repo_url) = descriptor.repo_url.as_deref() {
                    let script_path = descriptor.script_path_or_default();
                    record.repo_url = Some(repo_url.to_string());
                    record.script_path = Some(script_path.to_string());

                    match self.locator.read(repo_url, script_path) {
                        Some(content) => {
                            let evidence = self.matcher.evidence(&content);
                            if evidence.is_positive() {
                                record.sources.push(SourceFinding::evidence(
                                    Source::ScmJenkinsfile,
                                    evidence,
                                ));
                            }
                        }
                        None => {
                            record.sources.push(SourceFinding::note(
                                Source::JenkinsfileNotFound,
                                format!("{repo_url} ({script_path}) not resolvable locally"),
                            ));
                        }
                    }
                }
            }
            ScriptSource::None => {}
        }

        // Catch-all over the whole document for legacy and freestyle jobs
        // whose usage lives outside the recognized script sources.
        let script_already_matched = record
            .sources
            .iter()
            .any(|s| matches!(s.source, Source::InlineScript | Source::ScmJenkinsfile));
        if !script_already_matched {
            let evidence = self.matcher.evidence(&config_xml);
            if evidence.is_positive() {
                record
                    .sources
                    .push(SourceFinding::evidence(Source::XmlFallback, evidence));
            }
        }

        record.found = record.sources.iter().any(SourceFinding::is_positive);
        record
    }

    fn export_config(&self, job_name: &str, config_xml: &str) {
        let Some(dir) = self.export_dir.as_deref() else {
            return;
        };
        let safe_name = job_name.replace(['/', ' '], "_");
        let path = dir.join(format!("{safe_name}.xml"));
        if let Err(e) = std::fs::write(&path, config_xml) {
            warn!(path = %path.display(), error = %e, "Failed to export config");
        }
    }
}
