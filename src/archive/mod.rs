//! On-disk archive
//!
//! Layout under the output directory:
//!
//! ```text
//! data/
//!   html/            raw HTML pages
//!   pdf/             downloaded PDFs
//!   docs/            other downloaded documents (doc/docx/xls/xlsx/txt)
//!   text/            extracted plain text renderings
//!   metadata.jsonl   append-only record log, one JSON object per line
//!   metadata.json    full array, rebuilt from the log after each cycle
//! ```
//!
//! The JSONL log is the source of truth; metadata.json is a convenience
//! view. Each record is appended with a single write so a crash mid-run
//! leaves at most one garbled line, which the rebuild skips.

mod extract;
mod record;

pub use extract::{
    extract_text, has_document_extension, truncate_chars, DocKind, MAX_CONTENT_CHARS,
};
pub use record::CrawlRecord;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::Result;

const METADATA_LOG: &str = "metadata.jsonl";
const METADATA_JSON: &str = "metadata.json";

/// Handle to the archive directory tree.
pub struct Archive {
    root: PathBuf,
}

impl Archive {
    /// Opens an archive rooted at `root`, creating the directory layout.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let archive = Self { root: root.into() };
        archive.ensure_layout()?;
        Ok(archive)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_layout(&self) -> Result<()> {
        for dir in ["html", "pdf", "docs", "text"] {
            fs::create_dir_all(self.root.join(dir))?;
        }
        Ok(())
    }

    /// Saves a raw HTML page, returning its archive-relative path.
    pub fn save_html(&self, name: &str, body: &str) -> Result<String> {
        let rel = format!("html/{}.html", name);
        fs::write(self.root.join(&rel), body)?;
        Ok(rel)
    }

    /// Saves extracted plain text, returning its archive-relative path.
    pub fn save_text(&self, name: &str, text: &str) -> Result<String> {
        let rel = format!("text/{}.txt", name);
        fs::write(self.root.join(&rel), text)?;
        Ok(rel)
    }

    /// Saves a downloaded document body, returning its archive-relative path.
    pub fn save_document(&self, kind: DocKind, name: &str, body: &[u8]) -> Result<String> {
        let rel = format!("{}/{}.{}", kind.archive_dir(), name, kind.label());
        fs::write(self.root.join(&rel), body)?;
        Ok(rel)
    }

    /// Absolute path for an archive-relative path.
    pub fn absolute(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Appends a record to metadata.jsonl as one line, written in a single
    /// call.
    pub fn append_record(&self, record: &CrawlRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.root.join(METADATA_LOG))?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Rebuilds metadata.json from the JSONL log, skipping unparseable
    /// lines. Returns the number of records written.
    pub fn rebuild_metadata_json(&self) -> Result<usize> {
        let log_path = self.root.join(METADATA_LOG);
        let records = if log_path.exists() {
            let raw = fs::read_to_string(&log_path)?;
            let mut records: Vec<serde_json::Value> = Vec::new();
            for line in raw.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str(line) {
                    Ok(value) => records.push(value),
                    Err(e) => tracing::warn!("Skipping bad metadata line: {}", e),
                }
            }
            records
        } else {
            Vec::new()
        };

        let count = records.len();
        let json = serde_json::to_string_pretty(&records)?;
        fs::write(self.root.join(METADATA_JSON), json)?;
        Ok(count)
    }

    /// URLs already present in the log, for cross-run dedup.
    pub fn archived_urls(&self) -> Result<std::collections::HashSet<String>> {
        let log_path = self.root.join(METADATA_LOG);
        let mut urls = std::collections::HashSet::new();
        if !log_path.exists() {
            return Ok(urls);
        }
        let raw = fs::read_to_string(&log_path)?;
        for line in raw.lines() {
            if let Ok(record) = serde_json::from_str::<CrawlRecord>(line) {
                urls.insert(record.url);
            }
        }
        Ok(urls)
    }
}
