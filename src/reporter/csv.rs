//! CSV export of per-job provenance, one row per job.

use crate::report::ScanReport;
use crate::reporter::Reporter;
use crate::resolver::ProvenanceRecord;

pub struct CsvReporter;

impl CsvReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

fn total_usages(record: &ProvenanceRecord) -> usize {
    record
        .sources
        .iter()
        .filter_map(|s| s.evidence.as_ref())
        .map(|e| e.usage_count)
        .sum()
}

fn is_defined(record: &ProvenanceRecord) -> bool {
    record.sources.iter().any(|s| {
        s.evidence
            .as_ref()
            .is_some_and(|e| e.defined_as_parameter)
    })
}

fn render(report: &ScanReport) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record([
        "Job Name",
        "Job URL",
        "Job Type",
        "Found",
        "Defined",
        "Usages",
        "Sources",
        "Repo URL",
        "Script Path",
    ])?;

    for record in &report.records {
        let sources: Vec<&str> = record.sources.iter().map(|s| s.source.as_str()).collect();
        writer.write_record([
            record.job_name.as_str(),
            record.job_url.as_str(),
            record.job_type.as_str(),
            yes_no(record.found),
            yes_no(is_defined(record)),
            &total_usages(record).to_string(),
            &sources.join(";"),
            record.repo_url.as_deref().unwrap_or(""),
            record.script_path.as_deref().unwrap_or(""),
        ])?;
    }

    writer.flush()?;
    Ok(writer.into_inner().unwrap_or_default())
}

impl Reporter for CsvReporter {
    fn report(&self, report: &ScanReport) -> String {
        match render(report) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => format!("error,Failed to render CSV: {e}"),
        }
    }
}
