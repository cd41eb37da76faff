use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::ProcessedResult;

const IMAGE_SUFFIXES: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndexMetadata {
    Note {
        topic: String,
        source_file: String,
        /// Comma-joined
        tags: String,
        is_image: bool,
    },
    CalendarEvent {
        date: String,
        time: String,
        source_file: String,
        tags: String,
    },
}

/// One searchable text with its filter metadata, ready for a vector store
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IndexDocument {
    pub id: String,
    pub text: String,
    pub metadata: IndexMetadata,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct IndexStats {
    pub total_documents: usize,
    pub notes: usize,
    pub events: usize,
}

fn is_image_source(source: &str) -> bool {
    let lower = source.to_lowercase();
    IMAGE_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}

/// Flatten notes and events into index documents. Ids keep the position in
/// the original list, so skipped blanks leave gaps.
pub fn build_index_documents(result: &ProcessedResult) -> (Vec<IndexDocument>, IndexStats) {
    let mut documents = Vec::new();
    let mut stats = IndexStats::default();

    for (i, note) in result.notes.iter().enumerate() {
        if note.content.trim().is_empty() {
            continue;
        }
        documents.push(IndexDocument {
            id: format!("note_{i}"),
            text: note.content.clone(),
            metadata: IndexMetadata::Note {
                topic: note.topic.clone(),
                source_file: note.source_file.clone(),
                tags: note.tags.join(","),
                is_image: is_image_source(&note.source_file),
            },
        });
        stats.notes += 1;
    }

    for (i, event) in result.calendar_events.iter().enumerate() {
        let text = format!("{}. {}", event.title, event.description)
            .trim()
            .to_string();
        documents.push(IndexDocument {
            id: format!("event_{i}"),
            text,
            metadata: IndexMetadata::CalendarEvent {
                date: event.date.clone(),
                time: event.time.clone().unwrap_or_default(),
                source_file: event
                    .source_file
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
                tags: String::new(),
            },
        });
        stats.events += 1;
    }

    stats.total_documents = documents.len();
    (documents, stats)
}

/// Writes index documents as JSON lines
pub struct IndexWriter {
    index_dir: PathBuf,
}

impl IndexWriter {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            index_dir: output_dir.join("index"),
        }
    }

    pub fn documents_path(&self) -> PathBuf {
        self.index_dir.join("documents.jsonl")
    }

    pub fn write(&self, result: &ProcessedResult) -> Result<IndexStats> {
        fs::create_dir_all(&self.index_dir)?;
        let (documents, stats) = build_index_documents(result);

        let path = self.documents_path();
        let mut out = BufWriter::new(fs::File::create(&path)?);
        for doc in &documents {
            serde_json::to_writer(&mut out, doc)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;

        tracing::info!(
            path = %path.display(),
            notes = stats.notes,
            events = stats.events,
            "Index documents written"
        );
        Ok(stats)
    }
}
