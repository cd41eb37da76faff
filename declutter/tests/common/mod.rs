#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use declutter::config::ExtractionConfig;
use declutter::processing::FileParser;

/// A throwaway input directory
pub struct Desktop {
    dir: TempDir,
}

impl Desktop {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn add(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents)
            .unwrap_or_else(|e| panic!("Failed to write fixture '{name}': {e}"));
        path
    }

    pub fn add_dir(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::create_dir_all(&path).expect("Failed to create fixture dir");
        path
    }
}

pub fn default_parser() -> FileParser {
    FileParser::new(ExtractionConfig::default()).expect("Default config must build a parser")
}

/// `total` machine lines with human comments at the given 1-based positions
pub fn noisy_log(total: usize, human_at: &[usize]) -> String {
    let mut out = String::new();
    for n in 1..=total {
        if human_at.contains(&n) {
            out.push_str(&format!("2025-09-25T10:00:00Z worker-{n} # TODO: investigate retry {n}\n"));
        } else {
            out.push_str(&format!(
                "2025-09-25T10:00:00Z INFO: request completed id={n} status=200\n"
            ));
        }
    }
    out
}

/// Minimal valid PNG header bytes
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n";
