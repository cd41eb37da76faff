use base64::Engine;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use crate::error::{DeclutterError, Result};
use crate::models::{EncodedImage, FileType, ParsedFile};
use crate::processing::extractors::csv::{open_csv, render_row};
use crate::processing::extractors::json::to_pretty;

/// Full UTF-8 contents, verbatim. Empty files get a placeholder so the record
/// still carries content.
pub fn read_text(path: &Path, filename: &str, file_type: FileType) -> Result<ParsedFile> {
    let bytes = fs::read(path)?;
    let content = String::from_utf8(bytes)
        .map_err(|e| DeclutterError::Processing(format!("not valid UTF-8: {e}")))?;
    let content = if content.is_empty() {
        format!("[Empty file: {filename}]")
    } else {
        content
    };
    Ok(ParsedFile::text(
        filename,
        path.to_string_lossy(),
        file_type,
        content,
    ))
}

/// Summary line block followed by every row as a key/value mapping
pub fn read_csv(path: &Path, filename: &str) -> Result<ParsedFile> {
    let mut reader = open_csv(BufReader::new(File::open(path)?))?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(render_row(&headers, &record?));
    }

    let mut content = format!(
        "CSV File: {filename}\nColumns: {}\nRows: {}\n\n",
        headers.join(", "),
        rows.len()
    );
    for row in &rows {
        content.push_str(row);
        content.push('\n');
    }

    Ok(ParsedFile::text(
        filename,
        path.to_string_lossy(),
        FileType::Csv,
        content,
    ))
}

/// Parsed and re-serialized with two-space indentation
pub fn read_json(path: &Path, filename: &str) -> Result<ParsedFile> {
    let value: serde_json::Value = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    Ok(ParsedFile::text(
        filename,
        path.to_string_lossy(),
        FileType::Json,
        to_pretty(&value)?,
    ))
}

pub fn media_type_for(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

/// Raw bytes as standard base64; content is only a placeholder
pub fn read_image(path: &Path, filename: &str, extension: &str) -> Result<ParsedFile> {
    let bytes = fs::read(path)?;
    let image = EncodedImage {
        media_type: media_type_for(extension).to_string(),
        data: base64::engine::general_purpose::STANDARD.encode(&bytes),
    };
    Ok(ParsedFile::image(filename, path.to_string_lossy(), image))
}
