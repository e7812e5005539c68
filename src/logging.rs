//! File logging.
//!
//! Stdout carries rendered pages, so diagnostics go to one log file per run
//! under the local data directory (e.g. `~/.local/share/tldr/logs/`). The
//! page cache is never used for logs since a reload purges it.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// How long old log files are kept by default: one day.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

const LOG_PREFIX: &str = "tldr_";
const LOG_SUFFIX: &str = "log";

/// Settings of the log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Write a log file at all.
    pub enabled: bool,
    /// Most verbose level written, unless `RUST_LOG` overrides it.
    pub level: LevelFilter,
    /// Log files older than this are deleted on startup.
    pub retention: Duration,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: LevelFilter::INFO,
            retention: DEFAULT_RETENTION,
        }
    }
}

impl LogConfig {
    /// Parses a level name; `warning` and `none` are accepted as aliases.
    #[must_use]
    pub fn parse_level(value: &str) -> Option<LevelFilter> {
        match value.trim().to_ascii_lowercase().as_str() {
            "warning" => Some(LevelFilter::WARN),
            "none" | "disabled" => Some(LevelFilter::OFF),
            other => other.parse().ok(),
        }
    }

    /// Parses a retention period given in hours.
    #[must_use]
    pub fn parse_retention(value: &str) -> Option<Duration> {
        let hours: u64 = value.trim().parse().ok()?;
        Some(Duration::from_secs(hours.saturating_mul(3600)))
    }
}

/// Directory holding the log files.
#[must_use]
pub fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tldr")
        .join("logs")
}

/// Path of a new log file in `dir`, named after the current local time.
#[must_use]
pub fn log_path_in(dir: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    dir.join(format!("{}{}.{}", LOG_PREFIX, stamp, LOG_SUFFIX))
}

fn is_log_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    name.starts_with(LOG_PREFIX) && path.extension().and_then(|e| e.to_str()) == Some(LOG_SUFFIX)
}

/// Removes log files in `dir` last modified more than `retention` ago.
///
/// Files not written by [`init`] are left alone. Returns how many were
/// removed.
pub fn cleanup_old_logs(dir: &Path, retention: Duration) -> io::Result<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let Some(cutoff) = SystemTime::now().checked_sub(retention) else {
        return Ok(0);
    };

    let mut removed = 0;
    for entry in entries {
        let path = entry?.path();
        if !is_log_file(&path) {
            continue;
        }
        let expired = fs::metadata(&path)
            .and_then(|m| m.modified())
            .is_ok_and(|modified| modified < cutoff);
        if expired && fs::remove_file(&path).is_ok() {
            removed += 1;
        }
    }
    Ok(removed)
}

/// Installs the global subscriber writing to a fresh log file.
///
/// Returns the log file path, or `None` when logging is disabled.
pub fn init(config: &LogConfig) -> io::Result<Option<PathBuf>> {
    if !config.enabled || config.level == LevelFilter::OFF {
        return Ok(None);
    }

    let dir = log_directory();
    fs::create_dir_all(&dir)?;
    let removed = cleanup_old_logs(&dir, config.retention)?;

    let path = log_path_in(&dir);
    let file = File::create(&path)?;

    let filter = EnvFilter::builder()
        .with_default_directive(config.level.into())
        .from_env_lossy();
    let layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry().with(filter).with(layer).init();

    tracing::debug!("Logging to {} ({} old file(s) removed)", path.display(), removed);
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_level() {
        assert_eq!(LogConfig::parse_level("DEBUG"), Some(LevelFilter::DEBUG));
        assert_eq!(LogConfig::parse_level("warning"), Some(LevelFilter::WARN));
        assert_eq!(LogConfig::parse_level("none"), Some(LevelFilter::OFF));
        assert_eq!(LogConfig::parse_level("loud"), None);
    }

    #[test]
    fn test_parse_retention() {
        assert_eq!(
            LogConfig::parse_retention("48"),
            Some(Duration::from_secs(48 * 3600))
        );
        assert_eq!(LogConfig::parse_retention("-1"), None);
    }

    #[test]
    fn test_log_path_in() {
        let path = log_path_in(Path::new("/logs"));
        assert!(path.starts_with("/logs"));
        assert!(is_log_file(&path));
    }

    #[test]
    fn test_cleanup_removes_only_expired_logs() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("tldr_20240101-000000.log");
        let notes = dir.path().join("notes.log");
        fs::write(&log, "x").unwrap();
        fs::write(&notes, "x").unwrap();

        assert_eq!(cleanup_old_logs(dir.path(), DEFAULT_RETENTION).unwrap(), 0);
        assert!(log.exists());

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cleanup_old_logs(dir.path(), Duration::from_millis(1)).unwrap(), 1);
        assert!(!log.exists());
        assert!(notes.exists(), "foreign files are kept");
    }

    #[test]
    fn test_cleanup_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            cleanup_old_logs(&dir.path().join("absent"), DEFAULT_RETENTION).unwrap(),
            0
        );
    }
}
