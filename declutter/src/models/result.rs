use serde::{Deserialize, Serialize};

use crate::error::{DeclutterError, Result};

fn default_topic() -> String {
    "uncategorized".to_string()
}

fn default_source() -> String {
    "unknown".to_string()
}

fn default_title() -> String {
    "Untitled".to_string()
}

/// A free-form note the language model filed under a topic
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_source")]
    pub source_file: String,
}

/// Something with a date attached
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarEvent {
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
    /// `HH:MM`, absent for all-day entries
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source_file: Option<String>,
}

impl CalendarEvent {
    /// Time of day, treating an empty string the same as a missing one
    pub fn time_of_day(&self) -> Option<&str> {
        self.time.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Structured output of the language-model step
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProcessedResult {
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub calendar_events: Vec<CalendarEvent>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl ProcessedResult {
    /// Parse a model reply that may wrap its JSON object in prose or code
    /// fences. Everything between the first `{` and the last `}` is parsed.
    pub fn from_response_text(text: &str) -> Result<Self> {
        let start = text.find('{');
        let end = text.rfind('}');

        match (start, end) {
            (Some(start), Some(end)) if end > start => {
                Ok(serde_json::from_str(&text[start..=end])?)
            }
            _ => Err(DeclutterError::Validation(
                "No JSON object found in response".to_string(),
            )),
        }
    }
}
