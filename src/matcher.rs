//! Text parameter matcher.
//!
//! Scans arbitrary text (inline pipeline scripts, Jenkinsfiles, whole config
//! documents) for declarations and usages of one named build parameter. The
//! pattern set is fixed: four typed declaration idioms and four interpolation
//! idioms. Overlapping usage matches from different idioms are all retained,
//! an intentional over-count bias so a usage is never silently hidden.

use crate::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// A short text excerpt around one usage match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageContext {
    /// Byte offset of the match in the scanned text. Keeps context ordering
    /// stable across runs.
    pub offset: usize,
    pub snippet: String,
}

/// Evidence of a parameter's presence in one text source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterEvidence {
    pub defined_as_parameter: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_kind: Option<String>,
    pub usage_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub usage_contexts: Vec<UsageContext>,
}

impl ParameterEvidence {
    /// True if the parameter is declared or referenced at least once.
    pub fn is_positive(&self) -> bool {
        self.defined_as_parameter || self.usage_count > 0
    }

    /// Evidence for a parameter declared outside script text (e.g. a job's
    /// XML parameter block), with no usage matches attached.
    pub fn defined(kind: Option<String>) -> Self {
        Self {
            defined_as_parameter: true,
            parameter_kind: kind,
            usage_count: 0,
            usage_contexts: Vec::new(),
        }
    }
}

/// Characters of surrounding text captured on each side of a usage match.
const CONTEXT_RADIUS: usize = 80;

/// Compiled matcher for one parameter name.
///
/// Declaration keywords (`string`, `booleanParam`, `choice`, `password` and
/// their `name:` argument) match case-insensitively; the parameter name itself
/// and all usage idioms are case-sensitive to avoid false positives on common
/// words.
pub struct TextMatcher {
    parameter: String,
    declarations: Vec<(&'static str, Regex)>,
    usages: Vec<Regex>,
}

const DECLARATION_KEYWORDS: &[&str] = &["string", "booleanParam", "choice", "password"];

impl TextMatcher {
    pub fn new(parameter: &str) -> Result<Self> {
        let name = regex::escape(parameter);

        let mut declarations = Vec::with_capacity(DECLARATION_KEYWORDS.len());
        for keyword in DECLARATION_KEYWORDS {
            let pattern = format!(
                r#"(?i:{keyword})\s*\(\s*(?i:name)\s*:\s*['"]{name}['"]"#
            );
            declarations.push((*keyword, Regex::new(&pattern)?));
        }

        let usages = vec![
            // ${NAME} / $NAME interpolation
            Regex::new(&format!(r"\$\{{?{name}\}}?"))?,
            // params.NAME
            Regex::new(&format!(r"params\.{name}"))?,
            // env.NAME
            Regex::new(&format!(r"env\.{name}"))?,
            // bare assignment
            Regex::new(&format!(r"{name}\s*="))?,
        ];

        Ok(Self {
            parameter: parameter.to_string(),
            declarations,
            usages,
        })
    }

    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    /// Scan `text` and return accumulated evidence. Empty text yields a
    /// zero-evidence record; this never fails.
    pub fn evidence(&self, text: &str) -> ParameterEvidence {
        if text.is_empty() {
            return ParameterEvidence::default();
        }

        let mut evidence = ParameterEvidence::default();

        for (keyword, pattern) in &self.declarations {
            if pattern.is_match(text) {
                evidence.defined_as_parameter = true;
                evidence.parameter_kind = Some((*keyword).to_string());
                break;
            }
        }

        for pattern in &self.usages {
            for m in pattern.find_iter(text) {
                evidence.usage_count += 1;
                evidence.usage_contexts.push(UsageContext {
                    offset: m.start(),
                    snippet: snippet_around(text, m.start(), m.end()),
                });
            }
        }

        // Matches are collected per idiom; re-order by position so output is
        // identical across runs regardless of which idiom produced a match.
        evidence.usage_contexts.sort_by_key(|c| c.offset);

        trace!(
            parameter = %self.parameter,
            defined = evidence.defined_as_parameter,
            usages = evidence.usage_count,
            "Matched text source"
        );

        evidence
    }
}

/// Extract up to `CONTEXT_RADIUS` characters on each side of a match,
/// newline-collapsed and trimmed. The radius counts characters, not bytes,
/// so multibyte text gets the same visible context.
fn snippet_around(text: &str, start: usize, end: usize) -> String {
    let from = text[..start]
        .char_indices()
        .rev()
        .nth(CONTEXT_RADIUS - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let to = text[end..]
        .char_indices()
        .nth(CONTEXT_RADIUS)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    text[from..to].replace('\n', " ").trim().to_string()
}
