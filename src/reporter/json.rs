use crate::report::ScanReport;
use crate::reporter::Reporter;

pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for JsonReporter {
    fn report(&self, report: &ScanReport) -> String {
        serde_json::to_string_pretty(report)
            .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize report: {}"}}"#, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_output_structure() {
        let reporter = JsonReporter::new();
        let report = ScanReport::new("https://jenkins.example.com", "ECR_PATH", Vec::new());
        let output = reporter.report(&report);

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["jenkins_url"], "https://jenkins.example.com");
        assert_eq!(parsed["parameter"], "ECR_PATH");
        assert_eq!(parsed["summary"]["total_jobs"], 0);
    }
}
