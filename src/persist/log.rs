// Append-only JSONL attempt log. One line per attempt, flushed per line, so
// the line count always equals the attempt count — the externally
// verifiable zero-silent-drop contract.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One structured log line per attempted component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub page_index: u32,
    pub figure_index: u32,
    pub colorspace: String,
    pub status: String,
    pub reason: Option<String>,
    pub output_path: Option<String>,
    /// Verified size of the persisted file; 0 unless persisted.
    pub bytes: u64,
    pub width: u32,
    pub height: u32,
    pub warnings: Vec<String>,
}

pub struct AttemptLog {
    file: File,
    path: PathBuf,
    count: u64,
}

impl AttemptLog {
    /// Create (or truncate) the log file at `path`.
    pub fn create(path: &Path) -> crate::error::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| {
                crate::error::ExtractError::log(format!(
                    "cannot create attempt log {}: {e}",
                    path.display()
                ))
            })?;
        Ok(AttemptLog {
            file,
            path: path.to_path_buf(),
            count: 0,
        })
    }

    /// Append one record and flush it.
    pub fn append(&mut self, record: &AttemptRecord) -> crate::error::Result<()> {
        let line = serde_json::to_string(record)?;
        writeln!(self.file, "{line}").map_err(|e| {
            crate::error::ExtractError::log(format!(
                "cannot append to attempt log {}: {e}",
                self.path.display()
            ))
        })?;
        self.file.flush().map_err(|e| {
            crate::error::ExtractError::log(format!(
                "cannot flush attempt log {}: {e}",
                self.path.display()
            ))
        })?;
        self.count += 1;
        Ok(())
    }

    /// Number of records appended so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(page: u32, figure: u32) -> AttemptRecord {
        AttemptRecord {
            page_index: page,
            figure_index: figure,
            colorspace: "rgb".to_string(),
            status: "persisted".to_string(),
            reason: None,
            output_path: Some(format!("page_{page:04}_fig_{figure:02}.png")),
            bytes: 123,
            width: 64,
            height: 64,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_line_count_matches_append_count() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("attempts.jsonl");
        let mut log = AttemptLog::create(&path).expect("create log");

        for i in 0..5 {
            log.append(&record(0, i)).expect("append");
        }
        assert_eq!(log.count(), 5);

        let content = std::fs::read_to_string(&path).expect("read log");
        assert_eq!(content.lines().count(), 5);
    }

    #[test]
    fn test_records_round_trip_through_json() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("attempts.jsonl");
        let mut log = AttemptLog::create(&path).expect("create log");
        log.append(&record(3, 1)).expect("append");

        let content = std::fs::read_to_string(&path).expect("read log");
        let parsed: AttemptRecord =
            serde_json::from_str(content.lines().next().unwrap()).expect("parse line");
        assert_eq!(parsed.page_index, 3);
        assert_eq!(parsed.figure_index, 1);
        assert_eq!(parsed.status, "persisted");
    }
}
