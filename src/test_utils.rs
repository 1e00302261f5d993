#[cfg(test)]
pub mod fixtures {
    use crate::jenkins::{ConfigFetcher, JobRef};
    use std::collections::HashMap;

    /// In-memory config fetcher; URLs without a registered config are
    /// unavailable, matching the collaborator contract.
    #[derive(Default)]
    pub struct FakeFetcher {
        configs: HashMap<String, String>,
    }

    impl FakeFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_config(mut self, job_url: &str, config_xml: String) -> Self {
            self.configs.insert(job_url.to_string(), config_xml);
            self
        }
    }

    impl ConfigFetcher for FakeFetcher {
        fn fetch_config(&self, job_url: &str) -> Option<String> {
            self.configs.get(job_url).cloned()
        }
    }

    /// A leaf (non-folder) job reference.
    pub fn job_ref(name: &str, url: &str) -> JobRef {
        JobRef {
            name: name.to_string(),
            url: url.to_string(),
            class_tag: "org.jenkinsci.plugins.workflow.job.WorkflowJob".to_string(),
        }
    }
}
