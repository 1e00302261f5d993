use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
    Csv,
    Html,
}

#[derive(Parser, Debug)]
#[command(
    name = "jenkins-param-audit",
    version,
    about = "Trace where Jenkins build parameters are defined and used",
    long_about = "jenkins-param-audit walks a Jenkins job tree over the JSON API and reports, \
for each job, where a build parameter is declared and referenced: job parameter blocks, \
inline pipeline scripts, Jenkinsfiles resolved from local clones, or raw config XML."
)]
pub struct Cli {
    /// Jenkins base URL, e.g. https://jenkins.example.com
    #[arg(long)]
    pub jenkins_url: String,

    /// Jenkins username for API authentication
    #[arg(long)]
    pub username: Option<String>,

    /// Jenkins API token for the given username
    #[arg(long)]
    pub token: Option<String>,

    /// Parameter name to audit (repeatable)
    #[arg(short, long = "parameter", required = true)]
    pub parameters: Vec<String>,

    /// Root directory holding local git clones, used to resolve SCM Jenkinsfiles
    #[arg(long)]
    pub git_repos_path: Option<PathBuf>,

    /// Also grep every repository under --git-repos-path for the parameter
    #[arg(long)]
    pub scan_repos: bool,

    /// Directory to write report artifacts into
    #[arg(short, long, default_value = "jenkins_scan_results")]
    pub output_dir: PathBuf,

    /// Output format printed to stdout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,

    /// Save each fetched config.xml under the output directory
    #[arg(long)]
    pub export_configs: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_basic_args() {
        let cli = Cli::try_parse_from([
            "jenkins-param-audit",
            "--jenkins-url",
            "https://j",
            "-p",
            "ECR_PATH",
        ])
        .unwrap();
        assert_eq!(cli.jenkins_url, "https://j");
        assert_eq!(cli.parameters, vec!["ECR_PATH"]);
        assert!(!cli.scan_repos);
        assert!(!cli.export_configs);
    }

    #[test]
    fn test_parameter_is_required() {
        let result = Cli::try_parse_from(["jenkins-param-audit", "--jenkins-url", "https://j"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_multiple_parameters() {
        let cli = Cli::try_parse_from([
            "jenkins-param-audit",
            "--jenkins-url",
            "https://j",
            "-p",
            "ECR_PATH",
            "-p",
            "DEPLOY_ENV",
        ])
        .unwrap();
        assert_eq!(cli.parameters, vec!["ECR_PATH", "DEPLOY_ENV"]);
    }

    #[test]
    fn test_parse_format_json() {
        let cli = Cli::try_parse_from([
            "jenkins-param-audit",
            "--jenkins-url",
            "https://j",
            "-p",
            "P",
            "--format",
            "json",
        ])
        .unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }

    #[test]
    fn test_parse_credentials() {
        let cli = Cli::try_parse_from([
            "jenkins-param-audit",
            "--jenkins-url",
            "https://j",
            "-p",
            "P",
            "--username",
            "audit",
            "--token",
            "abc123",
        ])
        .unwrap();
        assert_eq!(cli.username.as_deref(), Some("audit"));
        assert_eq!(cli.token.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_parse_repo_options() {
        let cli = Cli::try_parse_from([
            "jenkins-param-audit",
            "--jenkins-url",
            "https://j",
            "-p",
            "P",
            "--git-repos-path",
            "/srv/repos",
            "--scan-repos",
        ])
        .unwrap();
        assert_eq!(cli.git_repos_path.as_deref(), Some("/srv/repos".as_ref()));
        assert!(cli.scan_repos);
    }

    #[test]
    fn test_default_values() {
        let cli = Cli::try_parse_from([
            "jenkins-param-audit",
            "--jenkins-url",
            "https://j",
            "-p",
            "P",
        ])
        .unwrap();
        assert!(matches!(cli.format, OutputFormat::Terminal));
        assert_eq!(cli.output_dir, PathBuf::from("jenkins_scan_results"));
        assert!(cli.username.is_none());
        assert!(cli.git_repos_path.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_all_options() {
        let cli = Cli::try_parse_from([
            "jenkins-param-audit",
            "--jenkins-url",
            "https://j",
            "-p",
            "ECR_PATH",
            "--username",
            "audit",
            "--token",
            "t",
            "--git-repos-path",
            "/srv/repos",
            "--scan-repos",
            "--output-dir",
            "out",
            "--format",
            "html",
            "--export-configs",
            "--verbose",
        ])
        .unwrap();
        assert!(matches!(cli.format, OutputFormat::Html));
        assert!(cli.scan_repos);
        assert!(cli.export_configs);
        assert!(cli.verbose);
        assert_eq!(cli.output_dir, PathBuf::from("out"));
    }
}
