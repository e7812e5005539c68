//! Page access history.
//!
//! The history file holds one `page,count` line per page. Line order encodes
//! recency: the oldest access comes first and the most recent access is the
//! last line.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, TldrError};

use super::HISTORY_FILE;

/// How often a page has been looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    /// Page identifier.
    pub page: String,
    /// Number of accesses, always at least 1.
    pub count: u32,
}

impl HistoryRecord {
    /// Creates a record.
    #[must_use]
    pub fn new(page: impl Into<String>, count: u32) -> Self {
        Self {
            page: page.into(),
            count,
        }
    }

    /// Parses one `page,count` line, splitting on the first comma.
    fn parse_line(line: &str, line_no: usize) -> Result<Self> {
        let (page, count) = line.split_once(',').ok_or_else(|| TldrError::Parse {
            line: line_no,
            message: format!("missing count field in {:?}", line),
        })?;

        let count: u32 = count.trim().parse().map_err(|e| TldrError::Parse {
            line: line_no,
            message: format!("invalid count {:?}: {}", count, e),
        })?;
        if count == 0 {
            return Err(TldrError::Parse {
                line: line_no,
                message: "count must be positive".to_string(),
            });
        }

        Ok(Self::new(page, count))
    }
}

impl fmt::Display for HistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.page, self.count)
    }
}

/// Reads and updates the history file of a cache directory.
#[derive(Debug, Clone)]
pub struct HistoryTracker {
    path: PathBuf,
}

impl HistoryTracker {
    /// Creates a tracker for the history file inside `cache_dir`.
    #[must_use]
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            path: cache_dir.join(HISTORY_FILE),
        }
    }

    /// Path of the history file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads all records, oldest first.
    ///
    /// A missing history file is created empty.
    pub fn load(&self) -> Result<Vec<HistoryRecord>> {
        if !self.path.exists() {
            debug!("Creating empty history file {}", self.path.display());
            File::create(&self.path)?;
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut records = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(HistoryRecord::parse_line(&line, idx + 1)?);
        }

        Ok(records)
    }

    /// Records an access to `page` and moves it to the tail.
    ///
    /// Returns the updated record.
    ///
    /// Names that cannot be written back as one `page,count` line are
    /// rejected before the file is touched.
    pub fn record(&self, page: &str) -> Result<HistoryRecord> {
        if page.trim().is_empty() || page.contains([',', '\n', '\r']) {
            return Err(TldrError::Parse {
                line: 0,
                message: format!("page name {:?} cannot be stored in history", page),
            });
        }
        let mut records = self.load()?;

        let count = match records.iter().position(|r| r.page == page) {
            Some(idx) => records.remove(idx).count + 1,
            None => 1,
        };
        let record = HistoryRecord::new(page, count);
        records.push(record.clone());

        self.save(&records)?;
        Ok(record)
    }

    /// Returns up to `limit` records, most recent first.
    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>> {
        Ok(self.load()?.into_iter().rev().take(limit).collect())
    }

    /// Rewrites the history file with `records` in order.
    fn save(&self, records: &[HistoryRecord]) -> Result<()> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        for record in records {
            writeln!(writer, "{},{}", record.page, record.count)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_line() {
        assert_eq!(
            HistoryRecord::parse_line("git-pull,4", 1).unwrap(),
            HistoryRecord::new("git-pull", 4)
        );
    }

    #[test]
    fn test_parse_line_missing_count() {
        let err = HistoryRecord::parse_line("git-pull", 3).unwrap_err();
        assert!(matches!(err, TldrError::Parse { line: 3, .. }), "got {:?}", err);
    }

    #[test]
    fn test_parse_line_bad_count() {
        assert!(HistoryRecord::parse_line("tar,many", 1).is_err());
        assert!(HistoryRecord::parse_line("tar,0", 1).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(HistoryRecord::new("tar", 2).to_string(), "tar 2");
    }

    #[test]
    fn test_record_rewrites_file() {
        let dir = TempDir::new().unwrap();
        let tracker = HistoryTracker::new(dir.path());

        tracker.record("tar").unwrap();
        tracker.record("ls").unwrap();
        tracker.record("tar").unwrap();

        let content = fs::read_to_string(tracker.path()).unwrap();
        assert_eq!(content, "ls,1\ntar,2\n");
    }

    #[test]
    fn test_recent_reads_from_tail() {
        let dir = TempDir::new().unwrap();
        let tracker = HistoryTracker::new(dir.path());
        for page in ["a", "b", "c"] {
            tracker.record(page).unwrap();
        }

        let recent: Vec<String> = tracker
            .recent(2)
            .unwrap()
            .into_iter()
            .map(|r| r.page)
            .collect();
        assert_eq!(recent, vec!["c", "b"]);
    }

    #[test]
    fn test_load_skips_blank_lines() {
        let dir = TempDir::new().unwrap();
        let tracker = HistoryTracker::new(dir.path());
        fs::write(tracker.path(), "tar,1\n\nls,2\n").unwrap();

        assert_eq!(tracker.load().unwrap().len(), 2);
    }
}
