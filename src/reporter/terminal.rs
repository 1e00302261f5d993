use crate::report::ScanReport;
use crate::reporter::Reporter;
use crate::resolver::{ProvenanceRecord, Source, SourceFinding};
use colored::Colorize;

pub struct TerminalReporter {
    verbose: bool,
}

impl TerminalReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn source_label(&self, finding: &SourceFinding) -> colored::ColoredString {
        let label = finding.source.as_str();
        if finding.is_positive() {
            label.green()
        } else if finding.source == Source::JenkinsfileNotFound {
            label.yellow()
        } else {
            label.white()
        }
    }

    fn format_record(&self, record: &ProvenanceRecord) -> String {
        let mut output = String::new();

        let marker = if record.found {
            "[FOUND]".green().bold()
        } else {
            "[  -  ]".dimmed()
        };
        output.push_str(&format!(
            "{} {} ({})\n",
            marker,
            record.job_name.bold(),
            record.job_type
        ));

        for finding in &record.sources {
            let label = self.source_label(finding);
            match (&finding.evidence, &finding.note) {
                (Some(evidence), _) => {
                    let mut detail = format!("{} usage(s)", evidence.usage_count);
                    if evidence.defined_as_parameter {
                        let kind = evidence.parameter_kind.as_deref().unwrap_or("unknown kind");
                        detail = format!("defined ({kind}), {detail}");
                    }
                    output.push_str(&format!("    {label}: {detail}\n"));

                    if self.verbose {
                        for context in &evidence.usage_contexts {
                            output.push_str(&format!(
                                "        {} {}\n",
                                format!("@{}", context.offset).dimmed(),
                                context.snippet.dimmed()
                            ));
                        }
                    }
                }
                (None, Some(note)) => {
                    output.push_str(&format!("    {label}: {}\n", note.yellow()));
                }
                (None, None) => {
                    output.push_str(&format!("    {label}\n"));
                }
            }
        }

        output
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, report: &ScanReport) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n",
            format!(
                "jenkins-param-audit v{} - Parameter Provenance Report",
                report.version
            )
            .bold()
        ));
        output.push_str(&format!(
            "Server: {}  Parameter: {}\n\n",
            report.jenkins_url,
            report.parameter.cyan().bold()
        ));

        let records_to_show: Vec<_> = if self.verbose {
            report.records.iter().collect()
        } else {
            report.records.iter().filter(|r| r.found).collect()
        };

        if records_to_show.is_empty() {
            output.push_str(&format!(
                "{}\n",
                format!("No jobs reference {}.", report.parameter).green()
            ));
        } else {
            for record in &records_to_show {
                output.push_str(&self.format_record(record));
                output.push('\n');
            }
        }

        if !report.repo_matches.is_empty() {
            output.push_str(&format!(
                "{}\n",
                format!("Repository matches ({})", report.repo_matches.len()).bold()
            ));
            for repo in &report.repo_matches {
                output.push_str(&format!(
                    "  {} ({} line(s))\n",
                    repo.repo_name.cyan(),
                    repo.matches.len()
                ));
                if self.verbose {
                    for hit in &repo.matches {
                        output.push_str(&format!(
                            "      {}:{}: {}\n",
                            hit.file,
                            hit.line,
                            hit.content.trim().dimmed()
                        ));
                    }
                }
            }
            output.push('\n');
        }

        if let Some(reconciliation) = &report.reconciliation {
            if !reconciliation.orphan_jobs.is_empty() {
                output.push_str(&format!(
                    "{}\n",
                    "Jobs without repository evidence:".yellow().bold()
                ));
                for job in &reconciliation.orphan_jobs {
                    output.push_str(&format!("  - {job}\n"));
                }
                output.push('\n');
            }
            if !reconciliation.orphan_repos.is_empty() {
                output.push_str(&format!(
                    "{}\n",
                    "Repositories without a correlated job:".yellow().bold()
                ));
                for repo in &reconciliation.orphan_repos {
                    output.push_str(&format!("  - {repo}\n"));
                }
                output.push('\n');
            }
        }

        output.push_str(&format!("{}\n", "━".repeat(50)));
        let summary = &report.summary;
        output.push_str(&format!(
            "Summary: {} job(s) scanned, {} with parameter ({} defined, {} used only), {} coverage gap(s)\n",
            summary.total_jobs,
            summary.jobs_with_parameter.to_string().green().bold(),
            summary.defined_as_parameter,
            summary.used_only.to_string().yellow(),
            summary.coverage_gaps.to_string().yellow().bold()
        ));

        if summary.coverage_gaps > 0 {
            output.push_str(&format!(
                "{}\n",
                format!(
                    "Note: {} SCM-backed job(s) point at Jenkinsfiles not present locally; clone those repositories and re-run for full coverage.",
                    summary.coverage_gaps
                )
                .yellow()
            ));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::PipelineKind;
    use crate::matcher::ParameterEvidence;
    use crate::repo_scan::{GrepMatch, RepoMatch};

    fn record(name: &str, found: bool, sources: Vec<SourceFinding>) -> ProvenanceRecord {
        ProvenanceRecord {
            job_name: name.to_string(),
            job_url: format!("https://j/job/{name}/"),
            job_type: PipelineKind::Pipeline,
            found,
            sources,
            repo_url: None,
            script_path: None,
        }
    }

    fn usage_finding(source: Source, count: usize) -> SourceFinding {
        SourceFinding::evidence(
            source,
            ParameterEvidence {
                defined_as_parameter: false,
                parameter_kind: None,
                usage_count: count,
                usage_contexts: Vec::new(),
            },
        )
    }

    #[test]
    fn test_report_no_matches() {
        let reporter = TerminalReporter::new(false);
        let report = ScanReport::new("https://j", "ECR_PATH", Vec::new());
        let output = reporter.report(&report);

        assert!(output.contains("No jobs reference ECR_PATH"));
        assert!(output.contains("0 with parameter"));
    }

    #[test]
    fn test_report_shows_found_job_with_sources() {
        let reporter = TerminalReporter::new(false);
        let records = vec![record(
            "deploy",
            true,
            vec![usage_finding(Source::InlineScript, 3)],
        )];
        let output = reporter.report(&ScanReport::new("https://j", "ECR_PATH", records));

        assert!(output.contains("deploy"));
        assert!(output.contains("inline_script"));
        assert!(output.contains("3 usage(s)"));
    }

    #[test]
    fn test_report_hides_negative_jobs_unless_verbose() {
        let records = vec![record("quiet-job", false, Vec::new())];
        let report = ScanReport::new("https://j", "P", records);

        let normal = TerminalReporter::new(false).report(&report);
        assert!(!normal.contains("quiet-job"));

        let verbose = TerminalReporter::new(true).report(&report);
        assert!(verbose.contains("quiet-job"));
    }

    #[test]
    fn test_report_shows_defined_kind() {
        let reporter = TerminalReporter::new(false);
        let records = vec![record(
            "deploy",
            true,
            vec![SourceFinding::evidence(
                Source::JobParameters,
                ParameterEvidence::defined(Some("string".to_string())),
            )],
        )];
        let output = reporter.report(&ScanReport::new("https://j", "P", records));

        assert!(output.contains("defined (string)"));
    }

    #[test]
    fn test_report_shows_coverage_gap_note() {
        let reporter = TerminalReporter::new(false);
        let records = vec![record(
            "scm-job",
            true,
            vec![
                usage_finding(Source::JobParameters, 1),
                SourceFinding::note(
                    Source::JenkinsfileNotFound,
                    "git@repo (Jenkinsfile) not resolvable locally".to_string(),
                ),
            ],
        )];
        let output = reporter.report(&ScanReport::new("https://j", "P", records));

        assert!(output.contains("not resolvable locally"));
        assert!(output.contains("1 coverage gap(s)"));
        assert!(output.contains("clone those repositories"));
    }

    #[test]
    fn test_report_lists_repo_matches_and_orphans() {
        let reporter = TerminalReporter::new(false);
        let records = vec![record(
            "payments-service",
            true,
            vec![usage_finding(Source::InlineScript, 1)],
        )];
        let repo_matches = vec![RepoMatch {
            repo_name: "billing".to_string(),
            repo_path: "/repos/billing".into(),
            matches: vec![GrepMatch {
                file: "Jenkinsfile".to_string(),
                line: 12,
                content: "image = \"${ECR_PATH}\"".to_string(),
            }],
        }];
        let report =
            ScanReport::new("https://j", "ECR_PATH", records).with_repo_matches(repo_matches);
        let output = reporter.report(&report);

        assert!(output.contains("Repository matches (1)"));
        assert!(output.contains("billing"));
        assert!(output.contains("Jobs without repository evidence:"));
        assert!(output.contains("payments-service"));
        assert!(output.contains("Repositories without a correlated job:"));
    }

    #[test]
    fn test_verbose_shows_usage_contexts_and_grep_lines() {
        let reporter = TerminalReporter::new(true);
        let records = vec![record(
            "deploy",
            true,
            vec![SourceFinding::evidence(
                Source::InlineScript,
                ParameterEvidence {
                    defined_as_parameter: false,
                    parameter_kind: None,
                    usage_count: 1,
                    usage_contexts: vec![crate::matcher::UsageContext {
                        offset: 42,
                        snippet: "docker push ${ECR_PATH}".to_string(),
                    }],
                },
            )],
        )];
        let output = reporter.report(&ScanReport::new("https://j", "ECR_PATH", records));

        assert!(output.contains("@42"));
        assert!(output.contains("docker push"));
    }
}
