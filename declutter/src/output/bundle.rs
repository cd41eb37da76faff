use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::ParseReport;

/// Writes the parsed records as one text bundle ready to paste into a prompt
pub struct BundleWriter {
    output_dir: PathBuf,
}

impl BundleWriter {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }

    pub fn bundle_path(&self) -> PathBuf {
        self.output_dir.join("extracted.md")
    }

    /// Returns the path written and the bundle size in bytes
    pub fn write(&self, report: &ParseReport) -> Result<(PathBuf, usize)> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.bundle_path();
        let bundle = report.render_bundle();
        fs::write(&path, &bundle)?;

        tracing::info!(
            path = %path.display(),
            files = report.parsed_count(),
            bytes = bundle.len(),
            "Wrote extraction bundle"
        );
        Ok((path, bundle.len()))
    }
}
