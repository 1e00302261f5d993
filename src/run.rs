//! End-to-end scan orchestration: discovery, resolution, optional repository
//! scan, artifact writing, and stdout rendering.

use crate::cli::{Cli, OutputFormat};
use crate::error::{AuditError, Result};
use crate::jenkins::tree::collect_jobs;
use crate::jenkins::JenkinsClient;
use crate::locator::RepoFileLocator;
use crate::repo_scan::RepoScanner;
use crate::report::ScanReport;
use crate::reporter::csv::CsvReporter;
use crate::reporter::html::HtmlReporter;
use crate::reporter::json::JsonReporter;
use crate::reporter::terminal::TerminalReporter;
use crate::reporter::Reporter;
use crate::resolver::{CancelFlag, ParameterResolver};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub fn run(cli: &Cli, cancel: CancelFlag) -> Result<()> {
    if cli.scan_repos && cli.git_repos_path.is_none() {
        return Err(AuditError::Config(
            "--scan-repos requires --git-repos-path".to_string(),
        ));
    }

    let client = JenkinsClient::new(
        &cli.jenkins_url,
        cli.username.as_deref().unwrap_or_default(),
        cli.token.as_deref().unwrap_or_default(),
    )?;

    info!(url = %client.base_url(), "Discovering jobs");
    let jobs = collect_jobs(&client);
    if jobs.is_empty() {
        return Err(AuditError::NoJobsDiscovered(client.base_url().to_string()));
    }
    info!(jobs = jobs.len(), "Discovery complete");

    let out_dir = cli
        .output_dir
        .join(Local::now().format("%Y%m%d_%H%M%S").to_string());
    fs::create_dir_all(&out_dir).map_err(|e| AuditError::io(&out_dir, "create", e))?;

    let configs_dir = out_dir.join("configs");
    if cli.export_configs {
        fs::create_dir_all(&configs_dir).map_err(|e| AuditError::io(&configs_dir, "create", e))?;
    }

    let locator = RepoFileLocator::new(cli.git_repos_path.clone());
    if cli.git_repos_path.is_some() && !locator.is_available() {
        warn!("--git-repos-path does not exist; SCM Jenkinsfiles will not resolve");
    }

    for (idx, parameter) in cli.parameters.iter().enumerate() {
        if cancel.is_cancelled() {
            warn!(parameter, "Interrupted before scan; skipping");
            break;
        }

        info!(parameter, "Scanning for parameter");

        // Config XML is identical across parameters; export once.
        let export_dir = (cli.export_configs && idx == 0).then(|| configs_dir.clone());
        let resolver = ParameterResolver::new(&client, parameter)?
            .with_locator(locator.clone())
            .with_export_dir(export_dir)
            .with_cancel_flag(cancel.clone());
        let records = resolver.resolve_all(&jobs);

        let mut report = ScanReport::new(client.base_url(), parameter, records);
        if cli.scan_repos {
            if let Some(repos_path) = cli.git_repos_path.as_deref() {
                let matches = RepoScanner::new(repos_path).scan(parameter);
                report = report.with_repo_matches(matches);
            }
        }

        write_artifacts(&out_dir, parameter, &report)?;
        print_report(cli.format, cli.verbose, &report);
    }

    info!(output_dir = %out_dir.display(), "Scan artifacts written");
    Ok(())
}

/// Persist the full JSON report, the flat CSV, and the HTML dashboard for one
/// parameter. Every scan leaves these behind regardless of --format.
fn write_artifacts(out_dir: &Path, parameter: &str, report: &ScanReport) -> Result<()> {
    let safe = safe_file_stem(parameter);

    let writes: [(PathBuf, String); 3] = [
        (
            out_dir.join(format!("scan_{safe}.json")),
            JsonReporter::new().report(report),
        ),
        (
            out_dir.join(format!("records_{safe}.csv")),
            CsvReporter::new().report(report),
        ),
        (
            out_dir.join(format!("report_{safe}.html")),
            HtmlReporter::new().report(report),
        ),
    ];

    for (path, content) in writes {
        fs::write(&path, content).map_err(|e| AuditError::io(&path, "write", e))?;
    }
    Ok(())
}

fn print_report(format: OutputFormat, verbose: bool, report: &ScanReport) {
    let output = match format {
        OutputFormat::Terminal => TerminalReporter::new(verbose).report(report),
        OutputFormat::Json => JsonReporter::new().report(report),
        OutputFormat::Csv => CsvReporter::new().report(report),
        OutputFormat::Html => HtmlReporter::new().report(report),
    };
    println!("{output}");
}

fn safe_file_stem(parameter: &str) -> String {
    parameter.replace(['/', ' '], "_")
}
