use serde::{Deserialize, Serialize};

/// Classification assigned to every parsed file
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Text,
    Code,
    Csv,
    Json,
    Image,
    Log,
    SystemLog,
    JsonDump,
    CsvNotes,
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Code => write!(f, "code"),
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
            Self::Image => write!(f, "image"),
            Self::Log => write!(f, "log"),
            Self::SystemLog => write!(f, "system_log"),
            Self::JsonDump => write!(f, "json_dump"),
            Self::CsvNotes => write!(f, "csv_notes"),
        }
    }
}

impl std::str::FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "code" => Ok(Self::Code),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "image" => Ok(Self::Image),
            "log" => Ok(Self::Log),
            "system_log" => Ok(Self::SystemLog),
            "json_dump" | "json-dump" => Ok(Self::JsonDump),
            "csv_notes" | "csv-notes" => Ok(Self::CsvNotes),
            _ => Err(format!("Unknown file type: {s}")),
        }
    }
}

/// Inline image payload, kept out of `content` so the text stays readable
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncodedImage {
    pub media_type: String,
    /// Standard base64 of the raw file bytes
    pub data: String,
}

impl EncodedImage {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// One normalized record per input file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedFile {
    pub filename: String,
    pub filepath: String,
    pub file_type: FileType,
    pub content: String,
    pub is_code: bool,
    pub image_encoded: Option<EncodedImage>,
}

impl ParsedFile {
    /// Non-image record; `content` is the text handed downstream
    pub fn text(
        filename: impl Into<String>,
        filepath: impl Into<String>,
        file_type: FileType,
        content: String,
    ) -> Self {
        Self {
            filename: filename.into(),
            filepath: filepath.into(),
            file_type,
            content,
            is_code: file_type == FileType::Code,
            image_encoded: None,
        }
    }

    /// Image record with a bracketed placeholder as `content`
    pub fn image(
        filename: impl Into<String>,
        filepath: impl Into<String>,
        image: EncodedImage,
    ) -> Self {
        let filename = filename.into();
        Self {
            content: format!("[Image file: {filename}]"),
            filename,
            filepath: filepath.into(),
            file_type: FileType::Image,
            is_code: false,
            image_encoded: Some(image),
        }
    }

    pub fn is_image(&self) -> bool {
        self.file_type == FileType::Image
    }
}

/// A file the parser could not turn into a record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedFile {
    pub filename: String,
    pub filepath: String,
    pub reason: String,
}

/// Outcome of parsing one directory: records in directory order, plus the
/// files that were dropped and why
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseReport {
    pub files: Vec<ParsedFile>,
    pub skipped: Vec<SkippedFile>,
}

impl ParseReport {
    pub fn parsed_count(&self) -> usize {
        self.files.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Concatenate every record into one prompt-ready text, each under a
    /// `--- FILE: <name> ---` header. Images contribute an `[IMAGE]` line with
    /// their placeholder; the base64 payload never enters the text.
    pub fn render_bundle(&self) -> String {
        let mut bundle = String::new();
        for file in &self.files {
            bundle.push_str(&format!("\n--- FILE: {} ---\n", file.filename));
            if file.is_image() {
                bundle.push_str(&format!("[IMAGE] {}\n", file.content));
            } else {
                bundle.push_str(&file.content);
                bundle.push('\n');
            }
        }
        bundle
    }
}
