//! Jenkins server collaborators.
//!
//! The resolver never talks to the network directly; it consumes the two
//! traits below. [`JenkinsClient`] is the production implementation backed by
//! the Jenkins JSON API; tests substitute in-memory fakes.

pub mod tree;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Identity of a job or folder as reported by the upstream listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRef {
    pub name: String,
    pub url: String,
    /// Jenkins item class, e.g. `com.cloudbees.hudson.plugins.folder.Folder`
    /// or `org.jenkinsci.plugins.workflow.job.WorkflowJob`.
    #[serde(rename = "_class", default)]
    pub class_tag: String,
}

impl JobRef {
    /// Folder-family items (plain folders and organization folders) are
    /// containers, not buildable jobs.
    pub fn is_folder(&self) -> bool {
        self.class_tag.contains("Folder")
    }
}

/// Lists the immediate children of one folder. One network call per folder.
pub trait JobListing {
    fn list_children(&self, folder_path: &str) -> Result<Vec<JobRef>>;

    /// Convert an absolute job URL into a server-relative folder path usable
    /// as a `list_children` argument.
    fn relativize(&self, job_url: &str) -> String {
        job_url.to_string()
    }
}

/// Fetches one job's raw configuration document. Unavailable configurations
/// (permissions, deleted jobs) are a common, valid outcome and yield `None`.
pub trait ConfigFetcher {
    fn fetch_config(&self, job_url: &str) -> Option<String>;
}

#[derive(Deserialize, Default)]
struct ListingResponse {
    #[serde(default)]
    jobs: Vec<JobRef>,
}

/// HTTP client for one Jenkins server, authenticated with an API token.
pub struct JenkinsClient {
    base_url: String,
    username: String,
    token: String,
    http: reqwest::blocking::Client,
}

impl JenkinsClient {
    pub fn new(base_url: &str, username: &str, token: &str) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            token: token.to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        let response = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(&self.token))
            .send()?
            .error_for_status()?;
        Ok(response)
    }
}

impl JobListing for JenkinsClient {
    fn list_children(&self, folder_path: &str) -> Result<Vec<JobRef>> {
        let url = format!(
            "{}/{}api/json?tree=jobs[name,url,_class]",
            self.base_url, folder_path
        );
        let listing: ListingResponse = self.get(&url)?.json()?;
        Ok(listing.jobs)
    }

    fn relativize(&self, job_url: &str) -> String {
        job_url
            .strip_prefix(&self.base_url)
            .unwrap_or(job_url)
            .trim_start_matches('/')
            .to_string()
    }
}

impl ConfigFetcher for JenkinsClient {
    fn fetch_config(&self, job_url: &str) -> Option<String> {
        let url = format!("{job_url}config.xml");
        match self.get(&url).and_then(|r| Ok(r.text()?)) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(job_url, error = %e, "Failed to fetch job config");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_ref_folder_detection() {
        let folder = JobRef {
            name: "team".to_string(),
            url: "https://jenkins.example.com/job/team/".to_string(),
            class_tag: "com.cloudbees.hudson.plugins.folder.Folder".to_string(),
        };
        assert!(folder.is_folder());

        let org_folder = JobRef {
            name: "gh".to_string(),
            url: "https://jenkins.example.com/job/gh/".to_string(),
            class_tag: "jenkins.branch.OrganizationFolder".to_string(),
        };
        assert!(org_folder.is_folder());

        let job = JobRef {
            name: "build".to_string(),
            url: "https://jenkins.example.com/job/build/".to_string(),
            class_tag: "org.jenkinsci.plugins.workflow.job.WorkflowJob".to_string(),
        };
        assert!(!job.is_folder());
    }

    #[test]
    fn test_job_ref_deserializes_class_field() {
        let json = r#"{"name": "a", "url": "https://j/job/a/", "_class": "hudson.model.FreeStyleProject"}"#;
        let job: JobRef = serde_json::from_str(json).unwrap();
        assert_eq!(job.class_tag, "hudson.model.FreeStyleProject");
        assert!(!job.is_folder());
    }

    #[test]
    fn test_job_ref_tolerates_missing_class() {
        let json = r#"{"name": "a", "url": "https://j/job/a/"}"#;
        let job: JobRef = serde_json::from_str(json).unwrap();
        assert!(job.class_tag.is_empty());
    }

    #[test]
    fn test_relativize_strips_base_url() {
        let client = JenkinsClient::new("https://jenkins.example.com/", "u", "t").unwrap();
        assert_eq!(
            client.relativize("https://jenkins.example.com/job/team/job/api/"),
            "job/team/job/api/"
        );
        // Foreign URLs pass through untouched.
        assert_eq!(
            client.relativize("https://other.example.com/job/x/"),
            "https://other.example.com/job/x/"
        );
    }

    #[test]
    fn test_listing_response_tolerates_missing_jobs() {
        let listing: ListingResponse = serde_json::from_str("{}").unwrap();
        assert!(listing.jobs.is_empty());
    }
}
