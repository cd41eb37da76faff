use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeclutterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl DeclutterError {
    /// Short, single-line reason suitable for a skipped-file report
    pub fn reason(&self) -> String {
        match self {
            DeclutterError::Io(e) => format!("unreadable: {e}"),
            DeclutterError::Json(e) => format!("malformed JSON: {e}"),
            DeclutterError::Csv(e) => format!("malformed CSV: {e}"),
            DeclutterError::Pattern(e) => format!("bad pattern: {e}"),
            DeclutterError::Processing(msg) => msg.clone(),
            DeclutterError::Validation(msg) => msg.clone(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DeclutterError>;
