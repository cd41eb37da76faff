use futures::stream::{self, StreamExt};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::handlers;
use super::{ExtractionMode, SmartExtractor};
use crate::config::ExtractionConfig;
use crate::error::{DeclutterError, Result};
use crate::models::{FileType, ParseReport, ParsedFile, SkippedFile};

/// Where a directory entry is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Extract(ExtractionMode),
    Text,
    Code,
    Csv,
    Json,
    Image,
    /// Unknown extension: best-effort plain text
    Fallback,
}

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

fn filename_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Turns a directory of mixed files into one normalized record per file.
///
/// Routing is table driven: the exact-filename table wins, then the extension
/// sets in the order text, code, csv, json, log, image.
pub struct FileParser {
    config: ExtractionConfig,
    extractor: SmartExtractor,
}

impl FileParser {
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        let extractor = SmartExtractor::new(&config)?;
        Ok(Self { config, extractor })
    }

    pub fn classify(&self, filename: &str) -> Route {
        if let Some(&mode) = self.config.extract_files.get(filename) {
            return Route::Extract(mode);
        }

        let Some(ext) = extension_of(filename) else {
            return Route::Fallback;
        };
        let c = &self.config;
        if c.text_extensions.contains(&ext) {
            Route::Text
        } else if c.code_extensions.contains(&ext) {
            Route::Code
        } else if c.csv_extensions.contains(&ext) {
            Route::Csv
        } else if c.json_extensions.contains(&ext) {
            Route::Json
        } else if c.log_extensions.contains(&ext) {
            Route::Extract(ExtractionMode::Log)
        } else if c.image_extensions.contains(&ext) {
            Route::Image
        } else {
            Route::Fallback
        }
    }

    /// Visible regular files directly under `dir`, sorted by name
    pub fn list_candidates(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if filename_of(&path).starts_with('.') || !path.is_file() {
                continue;
            }
            paths.push(path);
        }
        paths.sort_by_key(|p| filename_of(p));
        Ok(paths)
    }

    /// Parse one file. `Ok(None)` means an unknown-extension file that could
    /// not be read as text.
    pub fn parse_file(&self, path: &Path) -> Result<Option<ParsedFile>> {
        let filename = filename_of(path);
        let route = self.classify(&filename);
        tracing::debug!(file = %filename, route = ?route, "Routing file");

        let record = match route {
            Route::Extract(mode) => {
                let extracted = self.extractor.extract(path, mode)?;
                extracted.into_parsed_file(path.to_string_lossy(), mode)
            }
            Route::Text => handlers::read_text(path, &filename, FileType::Text)?,
            Route::Code => handlers::read_text(path, &filename, FileType::Code)?,
            Route::Csv => handlers::read_csv(path, &filename)?,
            Route::Json => handlers::read_json(path, &filename)?,
            Route::Image => {
                let ext = extension_of(&filename).unwrap_or_default();
                handlers::read_image(path, &filename, &ext)?
            }
            Route::Fallback => match handlers::read_text(path, &filename, FileType::Text) {
                Ok(record) => record,
                Err(e) => {
                    tracing::debug!(file = %filename, error = %e, "Unrecognized file is not text");
                    return Ok(None);
                }
            },
        };

        Ok(Some(record))
    }

    fn record_outcome(report: &mut ParseReport, path: &Path, outcome: Result<Option<ParsedFile>>) {
        let reason = match outcome {
            Ok(Some(record)) => {
                report.files.push(record);
                return;
            }
            Ok(None) => "unrecognized file type and not readable as text".to_string(),
            Err(e) => e.reason(),
        };

        let filename = filename_of(path);
        tracing::warn!(file = %filename, reason = %reason, "Skipping file");
        report.skipped.push(SkippedFile {
            filename,
            filepath: path.to_string_lossy().into_owned(),
            reason,
        });
    }

    /// Parse every candidate in directory order. A failing file is reported
    /// in `skipped` and never stops the batch.
    pub fn parse_directory(&self, dir: &Path) -> Result<ParseReport> {
        let mut report = ParseReport::default();
        for path in Self::list_candidates(dir)? {
            let outcome = self.parse_file(&path);
            Self::record_outcome(&mut report, &path, outcome);
        }

        tracing::info!(
            dir = %dir.display(),
            parsed = report.parsed_count(),
            skipped = report.skipped_count(),
            "Directory parsed"
        );
        Ok(report)
    }

    /// Same result as [`parse_directory`](Self::parse_directory), with up to
    /// `workers` files read at once on the blocking pool
    pub async fn parse_directory_concurrent(
        self: Arc<Self>,
        dir: &Path,
        workers: usize,
    ) -> Result<ParseReport> {
        let paths = Self::list_candidates(dir)?;

        let outcomes: Vec<(PathBuf, Result<Option<ParsedFile>>)> = stream::iter(paths)
            .map(|path| {
                let parser = Arc::clone(&self);
                async move {
                    let task_path = path.clone();
                    let outcome = tokio::task::spawn_blocking(move || parser.parse_file(&task_path))
                        .await
                        .unwrap_or_else(|e| {
                            Err(DeclutterError::Processing(format!("worker failed: {e}")))
                        });
                    (path, outcome)
                }
            })
            .buffered(workers.max(1))
            .collect()
            .await;

        let mut report = ParseReport::default();
        for (path, outcome) in outcomes {
            Self::record_outcome(&mut report, &path, outcome);
        }

        tracing::info!(
            dir = %dir.display(),
            workers,
            parsed = report.parsed_count(),
            skipped = report.skipped_count(),
            "Directory parsed concurrently"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parser() -> FileParser {
        FileParser::new(ExtractionConfig::default()).unwrap()
    }

    #[test]
    fn test_classify_table_wins_over_extension() {
        let p = parser();
        assert_eq!(
            p.classify("system_logs.txt"),
            Route::Extract(ExtractionMode::SystemLog)
        );
        assert_eq!(
            p.classify("api_responses_sample.json"),
            Route::Extract(ExtractionMode::Json)
        );
        assert_eq!(
            p.classify("dependencies_audit.csv"),
            Route::Extract(ExtractionMode::CsvNotes)
        );
        assert_eq!(p.classify("other.txt"), Route::Text);
    }

    #[test]
    fn test_classify_extension_sets() {
        let p = parser();
        assert_eq!(p.classify("README.md"), Route::Text);
        assert_eq!(p.classify("query.SQL"), Route::Code);
        assert_eq!(p.classify("app.tsx"), Route::Code);
        assert_eq!(p.classify("data.csv"), Route::Csv);
        assert_eq!(p.classify("data.json"), Route::Json);
        assert_eq!(p.classify("build.log"), Route::Extract(ExtractionMode::Log));
        assert_eq!(p.classify("photo.JPEG"), Route::Image);
        assert_eq!(p.classify("archive.tar.gz"), Route::Fallback);
        assert_eq!(p.classify("Makefile"), Route::Fallback);
    }

    #[test]
    fn test_list_candidates_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join(".hidden"), "h").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.txt"), "c").unwrap();

        let names: Vec<String> = FileParser::list_candidates(dir.path())
            .unwrap()
            .iter()
            .map(|p| filename_of(p))
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_parse_file_code_sets_is_code() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.py");
        fs::write(&path, "print('hi')\n").unwrap();

        let record = parser().parse_file(&path).unwrap().unwrap();
        assert_eq!(record.file_type, FileType::Code);
        assert!(record.is_code);
        assert_eq!(record.content, "print('hi')\n");
    }

    #[test]
    fn test_parse_file_fallback_binary_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob.bin");
        fs::write(&path, [0u8, 0xff, 0xfe]).unwrap();
        assert!(parser().parse_file(&path).unwrap().is_none());
    }

    #[test]
    fn test_parse_file_fallback_text_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.rst");
        fs::write(&path, "Title\n=====\n").unwrap();
        let record = parser().parse_file(&path).unwrap().unwrap();
        assert_eq!(record.file_type, FileType::Text);
    }

    #[test]
    fn test_parse_directory_reports_skips() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("good.json"), "[1, 2]").unwrap();
        fs::write(dir.path().join("bad.json"), "{oops").unwrap();
        fs::write(dir.path().join("blob.bin"), [0u8, 0xff]).unwrap();

        let report = parser().parse_directory(dir.path()).unwrap();
        assert_eq!(report.parsed_count(), 1);
        assert_eq!(report.files[0].filename, "good.json");

        let skipped: Vec<&str> = report.skipped.iter().map(|s| s.filename.as_str()).collect();
        assert_eq!(skipped, vec!["bad.json", "blob.bin"]);
        assert!(report.skipped[0].reason.starts_with("malformed JSON"));
    }

    #[test]
    fn test_parse_directory_missing_dir_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            parser().parse_directory(&missing),
            Err(DeclutterError::Io(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("real.txt"), "kept").unwrap();
        std::os::unix::fs::symlink(dir.path().join("missing.txt"), dir.path().join("dangling.txt"))
            .unwrap();

        let report = parser().parse_directory(dir.path()).unwrap();
        assert_eq!(report.parsed_count(), 1);
        assert_eq!(report.files[0].filename, "real.txt");
        assert_eq!(report.skipped_count(), 0);
    }
}
