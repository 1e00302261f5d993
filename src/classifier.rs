//! Pipeline config classifier.
//!
//! Parses one job's raw `config.xml` into a typed descriptor of how the job
//! sources its pipeline script. Parse failures degrade to `Unknown`; they
//! never surface to the caller.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default script path for SCM-backed pipelines when the config omits one.
pub const DEFAULT_SCRIPT_PATH: &str = "Jenkinsfile";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    Freestyle,
    Pipeline,
    #[default]
    Unknown,
}

impl PipelineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineKind::Freestyle => "freestyle",
            PipelineKind::Pipeline => "pipeline",
            PipelineKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScriptSource {
    Inline,
    Scm,
    #[default]
    None,
}

/// Classification of one job's pipeline definition. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDescriptor {
    pub kind: PipelineKind,
    pub script_source: ScriptSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_path: Option<String>,
}

impl PipelineDescriptor {
    /// Script path with the Jenkins default applied.
    pub fn script_path_or_default(&self) -> &str {
        self.script_path.as_deref().unwrap_or(DEFAULT_SCRIPT_PATH)
    }
}

/// Classify a raw config document. A parse error yields `Unknown` with all
/// optional fields absent.
pub fn classify(config_xml: &str) -> PipelineDescriptor {
    let doc = match roxmltree::Document::parse(config_xml) {
        Ok(doc) => doc,
        Err(e) => {
            debug!(error = %e, "Config XML did not parse; classifying as unknown");
            return PipelineDescriptor::default();
        }
    };

    let root = doc.root_element();
    match root.tag_name().name() {
        "flow-definition" => classify_pipeline(root),
        "project" | "maven2-moduleset" => PipelineDescriptor {
            kind: PipelineKind::Freestyle,
            ..Default::default()
        },
        _ => PipelineDescriptor::default(),
    }
}

fn classify_pipeline(root: roxmltree::Node<'_, '_>) -> PipelineDescriptor {
    let mut descriptor = PipelineDescriptor {
        kind: PipelineKind::Pipeline,
        ..Default::default()
    };

    let Some(definition) = root
        .descendants()
        .find(|n| n.has_tag_name("definition"))
    else {
        return descriptor;
    };

    let class = definition.attribute("class").unwrap_or("");

    if class.contains("CpsScmFlowDefinition") {
        descriptor.script_source = ScriptSource::Scm;
        descriptor.repo_url = definition
            .descendants()
            .find(|n| n.has_tag_name("scm"))
            .and_then(|scm| scm.descendants().find(|n| n.has_tag_name("url")))
            .and_then(|url| url.text())
            .map(|s| s.trim().to_string());
        descriptor.script_path = definition
            .descendants()
            .find(|n| n.has_tag_name("scriptPath"))
            .and_then(|n| n.text())
            .map(|s| s.trim().to_string());
    } else if class.contains("CpsFlowDefinition") {
        descriptor.script_source = ScriptSource::Inline;
        descriptor.inline_script = definition
            .children()
            .find(|n| n.has_tag_name("script"))
            .and_then(|n| n.text())
            .map(|s| s.to_string());
    }

    descriptor
}
