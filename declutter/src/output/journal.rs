use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{Note, ProcessedResult};

/// One markdown file written for a topic
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JournalFile {
    pub topic: String,
    pub path: PathBuf,
    pub notes_count: usize,
}

/// `machine_learning` -> `Machine Learning`: every run of letters starts
/// upper-case, the rest of the run is lower-cased
pub fn title_case(topic: &str) -> String {
    let mut out = String::with_capacity(topic.len());
    let mut in_word = false;
    for ch in topic.replace('_', " ").chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

/// Topic names come from a model; keep them to one safe path component
fn file_stem(topic: &str) -> String {
    let stem: String = topic
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() || stem.chars().all(|c| c == '_') {
        "uncategorized".to_string()
    } else {
        stem
    }
}

/// Groups `items` by `key`, keeping first-seen order of both keys and items
fn group_by<'a, T: 'a>(
    items: impl IntoIterator<Item = &'a T>,
    key: impl Fn(&'a T) -> &'a str,
) -> Vec<(&'a str, Vec<&'a T>)> {
    let mut groups: Vec<(&'a str, Vec<&'a T>)> = Vec::new();
    for item in items {
        let k = key(item);
        match groups.iter_mut().find(|(existing, _)| *existing == k) {
            Some((_, members)) => members.push(item),
            None => groups.push((k, vec![item])),
        }
    }
    groups
}

pub struct JournalWriter {
    journal_dir: PathBuf,
}

impl JournalWriter {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            journal_dir: output_dir.join("journal"),
        }
    }

    pub fn render(topic: &str, notes: &[&Note], generated_at: NaiveDateTime) -> String {
        let mut lines = vec![
            format!("# {}", title_case(topic)),
            String::new(),
            format!("*Generated on {}*", generated_at.format("%Y-%m-%d %H:%M")),
            String::new(),
            "---".to_string(),
            String::new(),
        ];

        for (source, source_notes) in group_by(notes.iter().copied(), |n| n.source_file.as_str()) {
            lines.push(format!("## From: {source}"));
            lines.push(String::new());
            for note in source_notes {
                lines.push(format!("- {}", note.content));
                if !note.tags.is_empty() {
                    let tags: Vec<String> = note.tags.iter().map(|t| format!("`#{t}`")).collect();
                    lines.push(format!("  {}", tags.join(" ")));
                }
                lines.push(String::new());
            }
        }

        lines.join("\n")
    }

    /// One file per topic, in the order topics first appear
    pub fn write(
        &self,
        result: &ProcessedResult,
        generated_at: NaiveDateTime,
    ) -> Result<Vec<JournalFile>> {
        fs::create_dir_all(&self.journal_dir)?;

        let mut written = Vec::new();
        for (topic, notes) in group_by(&result.notes, |n| n.topic.as_str()) {
            let path = self.journal_dir.join(format!("{}.md", file_stem(topic)));
            fs::write(&path, Self::render(topic, &notes, generated_at))?;
            tracing::info!(path = %path.display(), notes = notes.len(), "Journal written");
            written.push(JournalFile {
                topic: topic.to_string(),
                path,
                notes_count: notes.len(),
            });
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn note(topic: &str, content: &str, tags: &[&str], source: &str) -> Note {
        Note {
            topic: topic.to_string(),
            content: content.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            source_file: source.to_string(),
        }
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, 25)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap()
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("machine_learning"), "Machine Learning");
        assert_eq!(title_case("API notes"), "Api Notes");
        assert_eq!(title_case("devops-2fa"), "Devops-2Fa");
    }

    #[test]
    fn test_file_stem_strips_separators() {
        assert_eq!(file_stem("work"), "work");
        assert_eq!(file_stem("../etc/passwd"), "___etc_passwd");
        assert_eq!(file_stem("  "), "uncategorized");
    }

    #[test]
    fn test_render_groups_by_source() {
        let a = note("work", "Ship the release", &["release", "q3"], "todo.md");
        let b = note("work", "Rotate API keys", &[], "api.log");
        let c = note("work", "Write changelog", &[], "todo.md");

        let rendered = JournalWriter::render("work", &[&a, &b, &c], at());
        assert_eq!(
            rendered,
            "# Work\n\
             \n\
             *Generated on 2025-09-25 14:05*\n\
             \n\
             ---\n\
             \n\
             ## From: todo.md\n\
             \n\
             - Ship the release\n  `#release` `#q3`\n\
             \n\
             - Write changelog\n\
             \n\
             ## From: api.log\n\
             \n\
             - Rotate API keys\n"
        );
    }

    #[test]
    fn test_write_one_file_per_topic() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = ProcessedResult {
            topics: vec!["work".into(), "home_lab".into()],
            calendar_events: vec![],
            notes: vec![
                note("work", "a", &[], "x.md"),
                note("home_lab", "b", &[], "y.md"),
                note("work", "c", &[], "z.md"),
            ],
        };

        let writer = JournalWriter::new(dir.path());
        let files = writer.write(&result, at()).unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].topic, "work");
        assert_eq!(files[0].notes_count, 2);
        assert_eq!(files[1].path, dir.path().join("journal").join("home_lab.md"));

        let home = fs::read_to_string(&files[1].path).unwrap();
        assert!(home.starts_with("# Home Lab\n"));
    }
}
