//! Configuration module for tldr.
//!
//! Handles loading and parsing the .tldrrc configuration file and resolving
//! where the page cache lives.

pub mod platform;

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use platform::{COMMON_PLATFORM, PlatformResolver, SystemPlatform, current_platform};

use crate::cache::{CacheConfig, DEFAULT_REMOTE, DEFAULT_TTL};
use crate::error::{Result, TldrError};
use crate::logging::LogConfig;

/// Default .tldrrc file content with all settings documented.
const DEFAULT_TLDRRC: &str = r#"# tldr Configuration File
# ========================
# This file is read on every invocation.
# Lines starting with '#' are comments.
#
# Page Cache
# ----------
# Archive the pages are downloaded from.
# remote = https://tldr.sh/assets/tldr.zip
#
# Hours before the local copy is refreshed (default: 168, one week).
# The refresh only happens when the remote is reachable.
# ttl_hours = 168
#
# Cache directory. Defaults to $XDG_CACHE_HOME/tldr, then ~/.cache/tldr.
# cache_dir = /path/to/cache

# Output
# ------
# Colorize pages: auto (only on a terminal), always, never
# color = auto

# Logging Configuration
# ---------------------
# Logs are written under the local data directory (tldr/logs) with
# automatic cleanup.
#
# log_enabled = true       # Enable/disable file logging (true/false)
# log_level = info         # Log level: trace, debug, info, warn, error, off
# log_retention = 24       # Hours to keep log files (default: 24)
"#;

/// When page output is colorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Only when stdout is a terminal.
    #[default]
    Auto,
    /// Always.
    Always,
    /// Never.
    Never,
}

impl ColorMode {
    /// Parses a color mode, falling back to `Auto`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "always" | "true" | "yes" | "on" => Self::Always,
            "never" | "false" | "no" | "off" => Self::Never,
            _ => Self::Auto,
        }
    }

    /// Resolves the mode against whether the output is a terminal.
    #[must_use]
    pub fn enabled(self, is_terminal: bool) -> bool {
        match self {
            Self::Auto => is_terminal,
            Self::Always => true,
            Self::Never => false,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Archive URL.
    pub remote: String,
    /// Cache time-to-live.
    pub ttl: Duration,
    /// Explicit cache directory, if configured.
    pub cache_dir: Option<PathBuf>,
    /// Output colorization.
    pub color: ColorMode,
    /// Path to config file.
    pub config_path: PathBuf,
    /// Logging configuration.
    pub log_config: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: DEFAULT_REMOTE.to_string(),
            ttl: DEFAULT_TTL,
            cache_dir: None,
            color: ColorMode::Auto,
            config_path: Self::default_config_path(),
            log_config: LogConfig::default(),
        }
    }
}

impl Config {
    /// Returns the default config file path (~/.tldrrc).
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tldrrc")
    }

    /// Loads configuration from the default path, creating it if it doesn't exist.
    pub fn load() -> io::Result<Self> {
        let path = Self::default_config_path();
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> io::Result<Self> {
        if !path.exists() {
            Self::create_default_config(path)?;
        }

        let content = fs::read_to_string(path)?;
        let mut config = Self {
            config_path: path.to_path_buf(),
            ..Self::default()
        };
        config.parse(&content);
        Ok(config)
    }

    /// Creates the default config file.
    fn create_default_config(path: &Path) -> io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_TLDRRC.as_bytes())?;
        Ok(())
    }

    /// Parses the config file content.
    fn parse(&mut self, content: &str) {
        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim();

                // Remove inline comments
                let value = value.split(" #").next().unwrap_or(value).trim();

                self.apply_setting(key, value);
            }
        }
    }

    /// Applies a single setting.
    fn apply_setting(&mut self, key: &str, value: &str) {
        match key {
            "remote" => {
                if !value.is_empty() {
                    self.remote = value.to_string();
                }
            }
            "ttl" | "ttl_hours" => {
                if let Ok(hours) = value.parse::<u64>() {
                    self.ttl = Duration::from_secs(hours.saturating_mul(3600));
                }
            }
            "cache_dir" => {
                self.cache_dir = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            "color" | "colour" => {
                self.color = ColorMode::parse(value);
            }
            "log_level" => {
                if let Some(level) = LogConfig::parse_level(value) {
                    self.log_config.level = level;
                }
            }
            "log_retention" | "log_retention_hours" => {
                if let Some(retention) = LogConfig::parse_retention(value) {
                    self.log_config.retention = retention;
                }
            }
            "log_enabled" | "logging" => {
                self.log_config.enabled =
                    matches!(value.to_lowercase().as_str(), "true" | "yes" | "1" | "on");
            }
            _ => {
                tracing::debug!("Ignoring unknown setting {}", key);
            }
        }
    }

    /// Builds the cache configuration, resolving the cache directory.
    pub fn cache_config(&self) -> Result<CacheConfig> {
        let directory = resolve_cache_root(
            self.cache_dir.as_deref(),
            env::var_os("XDG_CACHE_HOME"),
            dirs::home_dir(),
        )?;
        Ok(CacheConfig::new(directory, self.remote.clone(), self.ttl))
    }
}

/// Resolves the cache root.
///
/// Order: explicit directory, `$XDG_CACHE_HOME/tldr`, `~/.cache/tldr`.
/// A relative explicit directory is taken relative to the working directory;
/// a relative `XDG_CACHE_HOME` is ignored.
pub fn resolve_cache_root(
    explicit: Option<&Path>,
    xdg_cache_home: Option<OsString>,
    home: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        if dir.is_absolute() {
            return Ok(dir.to_path_buf());
        }
        let cwd = env::current_dir().map_err(|e| {
            TldrError::Configuration(format!("cannot resolve {}: {}", dir.display(), e))
        })?;
        return Ok(cwd.join(dir));
    }

    if let Some(xdg) = xdg_cache_home.map(PathBuf::from) {
        if xdg.is_absolute() {
            return Ok(xdg.join("tldr"));
        }
    }

    home.filter(|h| !h.as_os_str().is_empty())
        .map(|h| h.join(".cache").join("tldr"))
        .ok_or_else(|| {
            TldrError::Configuration("could not determine the home directory".to_string())
        })
}
