use regex::Regex;

use crate::error::{DeclutterError, Result};

/// Decides whether a line of machine output carries something a person wrote
/// or needs to see.
///
/// All alternatives are compiled into one case-insensitive regex so every
/// extraction mode shares the same notion of "human-authored".
#[derive(Debug, Clone)]
pub struct HumanSignalMatcher {
    pattern: Regex,
    severity_markers: Vec<String>,
}

impl HumanSignalMatcher {
    pub fn new(patterns: &[String], severity_markers: &[String]) -> Result<Self> {
        if patterns.is_empty() {
            return Err(DeclutterError::Validation(
                "At least one human-signal pattern is required".to_string(),
            ));
        }

        let alternation = patterns
            .iter()
            .map(|p| format!("(?:{p})"))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!("(?i){alternation}"))?;

        Ok(Self {
            pattern,
            severity_markers: severity_markers
                .iter()
                .map(|m| m.to_uppercase())
                .collect(),
        })
    }

    /// Comment markers or natural-language cues such as "need to" or "blocked by"
    pub fn is_human(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }

    /// `[WARN`, `[ERROR` and friends, in any case
    pub fn is_severe(&self, line: &str) -> bool {
        if self.severity_markers.is_empty() {
            return false;
        }
        let upper = line.to_uppercase();
        self.severity_markers
            .iter()
            .any(|marker| upper.contains(marker.as_str()))
    }
}
