use std::io::BufRead;

use super::{ExtractedContent, SmartExtractor};
use crate::error::Result;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Open a header-keyed CSV reader, skipping a UTF-8 BOM and sniffing the
/// delimiter from the first buffered block so the rest of the input is
/// still streamed.
pub(crate) fn open_csv<R: BufRead>(mut reader: R) -> Result<csv::Reader<R>> {
    let (has_bom, delimiter) = {
        let sample = reader.fill_buf()?;
        let has_bom = sample.starts_with(&UTF8_BOM);
        let body = if has_bom { &sample[UTF8_BOM.len()..] } else { sample };
        (has_bom, detect_delimiter(body))
    };
    if has_bom {
        reader.consume(UTF8_BOM.len());
    }

    Ok(csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader))
}

const DELIMITER_CANDIDATES: [u8; 3] = [b',', b';', b'\t'];

/// Pick the candidate whose split gives the steadiest column count. Ties keep
/// the earlier candidate and a file no candidate splits reads as comma-separated.
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let (best, _) = DELIMITER_CANDIDATES
        .iter()
        .fold((b',', 0), |(best, best_score), &delimiter| {
            let score = score_delimiter(bytes, delimiter);
            if score > best_score {
                (delimiter, score)
            } else {
                (best, best_score)
            }
        });
    best
}

/// Score a delimiter on the header plus the first few rows. Higher is better;
/// zero means it never produced more than one column.
fn score_delimiter(bytes: &[u8], delimiter: u8) -> usize {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(bytes);

    let mut widths: Vec<usize> = reader.headers().map(|h| vec![h.len()]).unwrap_or_default();
    widths.extend(reader.records().take(5).flatten().map(|record| record.len()));

    match widths.first() {
        Some(&width) if width > 1 && widths.iter().all(|&w| w == width) => width * 10,
        Some(&width) if width > 1 => width,
        _ => 0,
    }
}

/// Render one row as `{"col": "value", ...}` in header order. Fields past the
/// last header are keyed by their 1-based column number.
pub(crate) fn render_row(headers: &[String], record: &csv::StringRecord) -> String {
    let pairs: Vec<String> = record
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let key = headers
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("column_{}", i + 1));
            format!(
                "{}: {}",
                serde_json::Value::String(key),
                serde_json::Value::String(field.to_string())
            )
        })
        .collect();
    format!("{{{}}}", pairs.join(", "))
}

impl SmartExtractor {
    /// Only the note-like columns of a large CSV, each tagged with the row's
    /// first column for context
    pub(super) fn csv_notes_content<R: BufRead>(
        &self,
        filename: &str,
        reader: R,
        original_size: u64,
    ) -> Result<ExtractedContent> {
        let mut csv_reader = open_csv(reader)?;
        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let note_indices: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| self.note_columns.contains(&h.to_lowercase()))
            .map(|(i, _)| i)
            .collect();

        let mut row_count = 0;
        let mut notes = Vec::new();

        for record in csv_reader.records() {
            let record = record?;
            row_count += 1;
            let context = record.get(0).unwrap_or("");
            for &idx in &note_indices {
                let value = record.get(idx).unwrap_or("").trim();
                if !value.is_empty() {
                    notes.push(format!("- [{context}] {value}"));
                }
            }
        }

        let content = if !notes.is_empty() {
            format!(
                "=== Notes from {filename} ===\n\
                 (Scanned {row_count} rows, found {} notes)\n\n{}",
                notes.len(),
                notes.join("\n")
            )
        } else {
            let summary = if note_indices.is_empty() {
                "no notes column found"
            } else {
                "no notes found"
            };
            format!(
                "=== {filename} ===\n\
                 (Scanned {row_count} rows, {summary})\n\
                 Columns: {}",
                headers.join(", ")
            )
        };

        Ok(ExtractedContent::new(
            filename,
            content,
            original_size,
            notes.len(),
        ))
    }
}
