use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::models::{FileType, ParsedFile};
use crate::processing::HumanSignalMatcher;

pub mod csv;
pub mod json;
pub mod log;

/// Bounded excerpt of a file that was too large or too machine-generated to
/// pass through untouched.
///
/// `extracted_size` is always the UTF-8 byte length of `meaningful_content`;
/// fields are private so it cannot drift from the text it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    filename: String,
    meaningful_content: String,
    original_size: u64,
    extracted_size: u64,
    items_found: usize,
    should_skip: bool,
    skip_reason: String,
}

impl ExtractedContent {
    pub fn new(
        filename: impl Into<String>,
        meaningful_content: String,
        original_size: u64,
        items_found: usize,
    ) -> Self {
        Self {
            filename: filename.into(),
            extracted_size: meaningful_content.len() as u64,
            meaningful_content,
            original_size,
            items_found,
            should_skip: false,
            skip_reason: String::new(),
        }
    }

    /// Flag the whole file as non-actionable. None of the built-in modes do
    /// this; it exists for callers layering their own policy on top.
    pub fn skip(mut self, reason: impl Into<String>) -> Self {
        self.should_skip = true;
        self.skip_reason = reason.into();
        self
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn meaningful_content(&self) -> &str {
        &self.meaningful_content
    }

    pub fn original_size(&self) -> u64 {
        self.original_size
    }

    pub fn extracted_size(&self) -> u64 {
        self.extracted_size
    }

    pub fn items_found(&self) -> usize {
        self.items_found
    }

    pub fn should_skip(&self) -> bool {
        self.should_skip
    }

    pub fn skip_reason(&self) -> &str {
        &self.skip_reason
    }

    pub fn into_parsed_file(self, filepath: impl Into<String>, mode: ExtractionMode) -> ParsedFile {
        ParsedFile::text(
            self.filename,
            filepath,
            mode.file_type(),
            self.meaningful_content,
        )
    }
}

/// How the extractor should read a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Generic large log: keep human comments only
    Log,
    /// Keep warnings, errors and human comments
    SystemLog,
    /// API snapshot dump or arbitrary JSON
    Json,
    /// Keep only note-like CSV columns
    CsvNotes,
}

impl ExtractionMode {
    pub fn file_type(self) -> FileType {
        match self {
            Self::Log => FileType::Log,
            Self::SystemLog => FileType::SystemLog,
            Self::Json => FileType::JsonDump,
            Self::CsvNotes => FileType::CsvNotes,
        }
    }
}

impl std::fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Log => write!(f, "log"),
            Self::SystemLog => write!(f, "system_log"),
            Self::Json => write!(f, "json"),
            Self::CsvNotes => write!(f, "csv_notes"),
        }
    }
}

impl std::str::FromStr for ExtractionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "system_log" => Ok(Self::SystemLog),
            "json" => Ok(Self::Json),
            "csv_notes" => Ok(Self::CsvNotes),
            _ => Err(format!("Unknown extraction mode: {s}")),
        }
    }
}

/// Scans a whole file and keeps only what a person would care about.
///
/// Every mode reads the input to the end; there is no size cap on the scan,
/// only on what is retained.
pub struct SmartExtractor {
    matcher: HumanSignalMatcher,
    /// Lowercased note column names
    note_columns: Vec<String>,
}

impl SmartExtractor {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        Ok(Self {
            matcher: HumanSignalMatcher::new(&config.human_patterns, &config.severity_markers)?,
            note_columns: config
                .note_columns
                .iter()
                .map(|c| c.to_lowercase())
                .collect(),
        })
    }

    pub fn matcher(&self) -> &HumanSignalMatcher {
        &self.matcher
    }

    /// Extract from a file on disk. `original_size` comes from the file's
    /// metadata, not from what was read.
    pub fn extract(&self, path: &Path, mode: ExtractionMode) -> Result<ExtractedContent> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file = File::open(path)?;
        let original_size = file.metadata()?.len();

        let extracted =
            self.extract_reader(&filename, BufReader::new(file), original_size, mode)?;

        tracing::debug!(
            file = %filename,
            mode = %mode,
            original_size = extracted.original_size(),
            extracted_size = extracted.extracted_size(),
            items = extracted.items_found(),
            "Extraction complete"
        );

        Ok(extracted)
    }

    /// Extract from any buffered source, e.g. `&[u8]` in tests
    pub fn extract_reader<R: BufRead>(
        &self,
        filename: &str,
        reader: R,
        original_size: u64,
        mode: ExtractionMode,
    ) -> Result<ExtractedContent> {
        match mode {
            ExtractionMode::Log => self.log_content(filename, reader, original_size),
            ExtractionMode::SystemLog => self.system_log_content(filename, reader, original_size),
            ExtractionMode::Json => self.json_content(filename, reader, original_size),
            ExtractionMode::CsvNotes => self.csv_notes_content(filename, reader, original_size),
        }
    }

    /// Convenience for in-memory input; `original_size` is the byte length
    pub fn extract_bytes(
        &self,
        filename: &str,
        bytes: &[u8],
        mode: ExtractionMode,
    ) -> Result<ExtractedContent> {
        self.extract_reader(filename, bytes, bytes.len() as u64, mode)
    }

    pub fn extract_from_log(&self, path: &Path) -> Result<ExtractedContent> {
        self.extract(path, ExtractionMode::Log)
    }

    pub fn extract_from_system_logs(&self, path: &Path) -> Result<ExtractedContent> {
        self.extract(path, ExtractionMode::SystemLog)
    }

    pub fn extract_from_json(&self, path: &Path) -> Result<ExtractedContent> {
        self.extract(path, ExtractionMode::Json)
    }

    pub fn extract_from_csv_notes(&self, path: &Path) -> Result<ExtractedContent> {
        self.extract(path, ExtractionMode::CsvNotes)
    }
}
