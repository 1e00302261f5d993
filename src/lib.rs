pub mod classifier;
pub mod cli;
pub mod error;
pub mod jenkins;
pub mod locator;
pub mod matcher;
pub mod reconcile;
pub mod repo_scan;
pub mod report;
pub mod reporter;
pub mod resolver;
pub mod run;

#[cfg(test)]
pub mod test_utils;

pub use cli::{Cli, OutputFormat};
pub use error::{AuditError, Result};
pub use jenkins::{ConfigFetcher, JenkinsClient, JobListing, JobRef};
pub use report::{ScanReport, ScanSummary};
pub use reporter::{
    Reporter, csv::CsvReporter, html::HtmlReporter, json::JsonReporter,
    terminal::TerminalReporter,
};
pub use resolver::{CancelFlag, ParameterResolver, ProvenanceRecord, Source, SourceFinding};
