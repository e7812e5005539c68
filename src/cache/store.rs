//! Filesystem-backed page cache.
//!
//! Owns the cache directory: creates it on first use, decides whether the
//! snapshot is stale, and rebuilds it from the remote archive.

use std::fs::{self, OpenOptions};
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use tracing::{debug, info, warn};

use super::{
    ArchiveExtractor, CacheConfig, HistoryRecord, HistoryTracker, INDEX_FILE, PAGE_SUFFIX,
    PageReader, RemoteFetcher, Repository,
};
use crate::error::{Result, TldrError};

/// Total time budget of the reachability probe, name resolution included.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// State of the on-disk snapshot relative to its TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// No cache directory, or no page tree inside it.
    Missing,
    /// Older than the TTL.
    Stale,
    /// Within the TTL.
    Fresh,
}

/// Page cache rooted at a local directory.
pub struct CacheStore {
    config: CacheConfig,
    fetcher: RemoteFetcher,
    extractor: ArchiveExtractor,
    probe_timeout: Duration,
}

impl CacheStore {
    /// Creates a store over `config` without touching the filesystem.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            fetcher: RemoteFetcher::new(),
            extractor: ArchiveExtractor::new(),
            probe_timeout: PROBE_TIMEOUT,
        }
    }

    /// Overrides the reachability probe budget.
    #[must_use]
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Creates a store and brings the cache up to date.
    ///
    /// A missing cache is always fetched. A stale cache is reloaded only if
    /// the remote answers the reachability probe; otherwise the existing
    /// snapshot is served as is.
    pub fn open(config: CacheConfig) -> Result<Self> {
        let store = Self::new(config);
        store.initialize()?;
        Ok(store)
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the cache root.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    /// Applies the freshness policy once.
    pub fn initialize(&self) -> Result<()> {
        match self.freshness_at(SystemTime::now()) {
            Freshness::Missing => {
                info!("Cache missing at {}, fetching pages", self.directory().display());
                self.make_skeleton()?;
                self.load_from_remote()
            }
            Freshness::Stale => {
                if self.is_reachable() {
                    info!("Cache is stale, reloading");
                    self.reload()
                } else {
                    warn!("Remote {} is not reachable, reload skipped", self.config.remote);
                    Ok(())
                }
            }
            Freshness::Fresh => {
                debug!("Cache is fresh");
                Ok(())
            }
        }
    }

    /// Evaluates the snapshot against `now - ttl`.
    #[must_use]
    pub fn freshness_at(&self, now: SystemTime) -> Freshness {
        let modified = match fs::metadata(self.directory()).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Freshness::Missing,
            Err(e) => {
                warn!("Cannot read cache metadata: {}", e);
                return Freshness::Stale;
            }
        };

        if !self.config.pages_dir().is_dir() {
            return Freshness::Missing;
        }

        match now.checked_sub(self.config.ttl) {
            Some(threshold) if modified < threshold => Freshness::Stale,
            _ => Freshness::Fresh,
        }
    }

    /// Probes the remote's host and port over TCP.
    ///
    /// Resolution and every connect attempt share one deadline. Any failure,
    /// including running out of time, means unreachable.
    #[must_use]
    pub fn is_reachable(&self) -> bool {
        let deadline = Instant::now() + self.probe_timeout;
        let Some(addrs) = resolve_before(&self.config.remote, deadline) else {
            debug!("Could not resolve {} in time", self.config.remote);
            return false;
        };
        connect_any(&addrs, deadline)
    }

    /// Purges the cache and rebuilds it from the remote archive.
    ///
    /// There is no rollback: a failure leaves the tree as the last completed
    /// step left it.
    pub fn reload(&self) -> Result<()> {
        let dir = self.directory();
        info!("Reloading cache at {}", dir.display());

        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        self.make_skeleton()?;
        self.load_from_remote()
    }

    /// Creates the cache directory and touches the history file.
    fn make_skeleton(&self) -> Result<()> {
        fs::create_dir_all(self.directory())?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.config.history_path())?;
        Ok(())
    }

    /// Fetches the archive, extracts it and removes it.
    fn load_from_remote(&self) -> Result<()> {
        let archive = self.config.archive_path();
        self.fetcher.fetch(&self.config.remote, &archive)?;
        self.extractor.extract(&archive, self.directory())?;
        Ok(())
    }

    /// Returns the history tracker of this cache.
    #[must_use]
    pub fn history(&self) -> HistoryTracker {
        HistoryTracker::new(self.directory())
    }

    /// Records an access to `page`.
    pub fn record_history(&self, page: &str) -> Result<HistoryRecord> {
        self.history().record(page)
    }

    /// Loads the access history, oldest first.
    pub fn load_history(&self) -> Result<Vec<HistoryRecord>> {
        self.history().load()
    }

    fn page_path(&self, platform: &str, page: &str) -> PathBuf {
        self.config
            .pages_dir()
            .join(platform)
            .join(format!("{}.{}", page, PAGE_SUFFIX))
    }
}

impl Repository for CacheStore {
    fn available_platforms(&self) -> Result<Vec<String>> {
        let pages_dir = self.config.pages_dir();
        let mut platforms = Vec::new();
        for entry in read_dir(&pages_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name != INDEX_FILE && entry.file_type()?.is_dir() {
                platforms.push(name);
            }
        }
        platforms.sort();
        Ok(platforms)
    }

    fn pages(&self) -> Result<Vec<String>> {
        let mut pages = Vec::new();
        collect_pages(&self.config.pages_dir(), &mut pages)?;
        pages.sort();
        pages.dedup();
        Ok(pages)
    }

    fn platform_pages(&self, platform: &str) -> Result<Vec<String>> {
        if !is_plain_name(platform) {
            return Err(TldrError::NotFound(platform.to_string()));
        }

        let dir = self.config.pages_dir().join(platform);
        let mut pages = Vec::new();
        for entry in read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = page_name(&entry.path()) {
                    pages.push(name);
                }
            }
        }
        pages.sort();
        Ok(pages)
    }

    fn markdown(&self, platform: &str, page: &str) -> Result<PageReader> {
        if !is_plain_name(platform) || !is_plain_name(page) {
            return Err(TldrError::NotFound(format!("{}/{}", platform, page)));
        }

        let path = self.page_path(platform, page);
        match fs::File::open(&path) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(TldrError::missing(&path)),
            Err(e) => Err(e.into()),
        }
    }
}

/// Lists a directory, mapping a missing directory to `NotFound`.
fn read_dir(dir: &Path) -> Result<fs::ReadDir> {
    fs::read_dir(dir).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            TldrError::missing(dir)
        } else {
            e.into()
        }
    })
}

/// Recursively gathers page names below `dir`.
fn collect_pages(dir: &Path, pages: &mut Vec<String>) -> Result<()> {
    for entry in read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_pages(&path, pages)?;
        } else if let Some(name) = page_name(&path) {
            pages.push(name);
        }
    }
    Ok(())
}

/// Page identifier of a `.md` file.
fn page_name(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some(PAGE_SUFFIX) {
        return None;
    }
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

/// True if `name` is a single path component.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// Resolves `remote` on a helper thread, giving up at `deadline`.
///
/// A resolver that hangs is left to finish on its own thread.
fn resolve_before(remote: &str, deadline: Instant) -> Option<Vec<SocketAddr>> {
    let (tx, rx) = mpsc::channel();
    let remote = remote.to_string();
    thread::spawn(move || {
        let _ = tx.send(remote_addrs(&remote));
    });

    rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
        .ok()
        .flatten()
}

/// Tries each address in turn with whatever time is left before `deadline`.
fn connect_any(addrs: &[SocketAddr], deadline: Instant) -> bool {
    for addr in addrs {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return false;
        }
        if TcpStream::connect_timeout(addr, remaining).is_ok() {
            return true;
        }
    }
    false
}

/// Resolves the socket addresses of a URL's host and port.
fn remote_addrs(remote: &str) -> Option<Vec<SocketAddr>> {
    let url = reqwest::Url::parse(remote).ok()?;
    let host = url.host_str()?;
    let port = url.port_or_known_default()?;
    (host, port)
        .to_socket_addrs()
        .ok()
        .map(|addrs| addrs.collect())
}
