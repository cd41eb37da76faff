use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::env;
use std::path::PathBuf;

use crate::processing::ExtractionMode;

/// Typed env override; an unparsable value logs a warning and keeps `default`.
fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    let Ok(raw) = env::var(var) else {
        return default;
    };
    raw.parse().unwrap_or_else(|e| {
        tracing::warn!(var, value = %raw, error = %e, "Ignoring invalid env value, using default");
        default
    })
}

/// Parse `DECLUTTER_EXTRACT_FILES` env var.
/// Format: comma-separated `filename:mode` pairs, e.g. `build.log:log,audit.csv:csv_notes`
fn parse_extract_files() -> HashMap<String, ExtractionMode> {
    match env::var("DECLUTTER_EXTRACT_FILES") {
        Ok(val) if !val.is_empty() => val
            .split(',')
            .filter_map(|pair| {
                let parsed = pair.rsplit_once(':').and_then(|(filename, mode)| {
                    let filename = filename.trim();
                    let mode = mode.trim().parse::<ExtractionMode>().ok()?;
                    (!filename.is_empty()).then(|| (filename.to_string(), mode))
                });
                if parsed.is_none() {
                    tracing::warn!(
                        "Invalid extraction pair '{}' in DECLUTTER_EXTRACT_FILES, skipping",
                        pair
                    );
                }
                parsed
            })
            .collect(),
        _ => HashMap::new(),
    }
}

fn parse_list(var: &str) -> Option<Vec<String>> {
    let val = env::var(var).ok()?;
    let items: Vec<String> = val
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn extension_set(exts: &[&str]) -> HashSet<String> {
    exts.iter().map(|e| e.to_string()).collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
}

/// Static routing tables and patterns for the parser and extractor.
///
/// Extensions are stored lowercase without the leading dot.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    pub text_extensions: HashSet<String>,
    pub code_extensions: HashSet<String>,
    pub csv_extensions: HashSet<String>,
    pub json_extensions: HashSet<String>,
    pub log_extensions: HashSet<String>,
    pub image_extensions: HashSet<String>,
    /// Exact filenames that always go through the extractor
    pub extract_files: HashMap<String, ExtractionMode>,
    /// Column names (compared case-insensitively) that hold human notes
    pub note_columns: Vec<String>,
    /// Alternatives of the human-signal matcher, compiled case-insensitively
    pub human_patterns: Vec<String>,
    /// Substrings (compared upper-cased) that flag a system log line
    pub severity_markers: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            text_extensions: extension_set(&["md", "txt"]),
            code_extensions: extension_set(&["py", "tsx", "ts", "js", "sql"]),
            csv_extensions: extension_set(&["csv"]),
            json_extensions: extension_set(&["json"]),
            log_extensions: extension_set(&["log"]),
            image_extensions: extension_set(&["jpg", "jpeg", "png", "gif", "webp"]),
            extract_files: HashMap::from([
                ("api-test-9-25.log".to_string(), ExtractionMode::Log),
                ("system_logs.txt".to_string(), ExtractionMode::SystemLog),
                ("api_responses_sample.json".to_string(), ExtractionMode::Json),
                ("dependencies_audit.csv".to_string(), ExtractionMode::CsvNotes),
            ]),
            note_columns: ["notes", "note", "comments", "comment", "description"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            human_patterns: [
                r"#\s*(NOTE|TODO|FIXME|REMINDER|XXX)",
                r"need to",
                r"don't forget",
                r"remember to",
                r"should (be|have|fix|check|update)",
                r"follow up",
                r"ask \w+",
                r"check with",
                r"waiting on",
                r"blocked by",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
            severity_markers: ["[WARN", "[ERROR", "[FATAL", "[CRITICAL"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

impl ExtractionConfig {
    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.extract_files.extend(parse_extract_files());
        if let Some(columns) = parse_list("DECLUTTER_NOTE_COLUMNS") {
            config.note_columns = columns;
        }
        config
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Files extracted in parallel by the concurrent parser
    pub workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::from_env(),
            pipeline: PipelineConfig {
                workers: parse_env_or("DECLUTTER_WORKERS", 4usize).max(1),
            },
            output: OutputConfig {
                output_dir: env::var("DECLUTTER_OUTPUT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./output")),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_extraction_defaults() {
        let config = ExtractionConfig::default();
        assert!(config.text_extensions.contains("md"));
        assert!(config.code_extensions.contains("sql"));
        assert!(config.image_extensions.contains("webp"));
        assert_eq!(
            config.extract_files.get("system_logs.txt"),
            Some(&ExtractionMode::SystemLog)
        );
        assert_eq!(config.note_columns.len(), 5);
        assert_eq!(config.human_patterns.len(), 10);
        assert_eq!(config.severity_markers.len(), 4);
    }

    #[test]
    fn test_workers_default_and_from_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("DECLUTTER_WORKERS");
        assert_eq!(Config::default().pipeline.workers, 4);

        std::env::set_var("DECLUTTER_WORKERS", "8");
        assert_eq!(Config::default().pipeline.workers, 8);

        std::env::set_var("DECLUTTER_WORKERS", "many");
        assert_eq!(Config::default().pipeline.workers, 4);

        std::env::set_var("DECLUTTER_WORKERS", "0");
        assert_eq!(Config::default().pipeline.workers, 1);

        std::env::remove_var("DECLUTTER_WORKERS");
    }

    #[test]
    fn test_output_dir_from_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("DECLUTTER_OUTPUT_DIR");
        assert_eq!(Config::default().output.output_dir, PathBuf::from("./output"));

        std::env::set_var("DECLUTTER_OUTPUT_DIR", "/tmp/declutter-out");
        assert_eq!(
            Config::default().output.output_dir,
            PathBuf::from("/tmp/declutter-out")
        );
        std::env::remove_var("DECLUTTER_OUTPUT_DIR");
    }

    #[test]
    fn test_extract_files_from_env_merges_and_skips_invalid() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::set_var(
            "DECLUTTER_EXTRACT_FILES",
            "build.log:system_log, audit.csv:csv_notes,broken,weird.txt:shout",
        );
        let config = ExtractionConfig::from_env();
        assert_eq!(
            config.extract_files.get("build.log"),
            Some(&ExtractionMode::SystemLog)
        );
        assert_eq!(
            config.extract_files.get("audit.csv"),
            Some(&ExtractionMode::CsvNotes)
        );
        assert!(!config.extract_files.contains_key("weird.txt"));
        assert!(config.extract_files.contains_key("api-test-9-25.log"));

        std::env::remove_var("DECLUTTER_EXTRACT_FILES");
    }

    #[test]
    fn test_note_columns_from_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::set_var("DECLUTTER_NOTE_COLUMNS", "remarks, memo");
        let config = ExtractionConfig::from_env();
        assert_eq!(config.note_columns, vec!["remarks", "memo"]);

        std::env::remove_var("DECLUTTER_NOTE_COLUMNS");
        let config = ExtractionConfig::from_env();
        assert_eq!(config.note_columns.len(), 5);
    }

    #[test]
    fn test_parse_env_or_valid_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        std::env::set_var("__TEST_PARSE_WORKERS", "12");
        let result: usize = parse_env_or("__TEST_PARSE_WORKERS", 4);
        assert_eq!(result, 12);
        std::env::remove_var("__TEST_PARSE_WORKERS");
    }
}
