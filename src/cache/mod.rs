//! Local page cache.
//!
//! Keeps a TTL-bounded copy of the remote page archive on disk:
//! - `store`: directory lifecycle, freshness and reload orchestration
//! - `fetch`: downloads the archive to a temporary file
//! - `extract`: unpacks the archive into the cache tree
//! - `history`: per-page access records
//! - `memory`: in-memory repository for tests and embedding
//!
//! Layout of the cache directory:
//!
//! ```text
//! <cache_root>/
//!   pages/<platform>/<page>.md
//!   pages/index.json
//!   history
//! ```

pub mod extract;
pub mod fetch;
pub mod history;
pub mod memory;
pub mod store;

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

pub use extract::ArchiveExtractor;
pub use fetch::RemoteFetcher;
pub use history::{HistoryRecord, HistoryTracker};
pub use memory::MemoryRepository;
pub use store::{CacheStore, Freshness};

use crate::error::Result;

/// Subdirectory holding the page tree.
pub const PAGES_DIR: &str = "pages";

/// Opaque index shipped with the archive, never treated as a platform.
pub const INDEX_FILE: &str = "index.json";

/// Flat access-history file.
pub const HISTORY_FILE: &str = "history";

/// Temporary archive written during a fetch.
pub const ARCHIVE_FILE: &str = "tldr.zip";

/// Extension of page files.
pub const PAGE_SUFFIX: &str = "md";

/// Default remote archive location.
pub const DEFAULT_REMOTE: &str = "https://tldr.sh/assets/tldr.zip";

/// Default time-to-live of a cache snapshot: one week.
pub const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Readable stream over one page's markup. Dropping it releases the handle.
pub type PageReader = Box<dyn Read + Send>;

/// Where the cache lives, where it is refreshed from, and how long a snapshot stays fresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Absolute path of the cache root.
    pub directory: PathBuf,
    /// URL of the zip archive.
    pub remote: String,
    /// Snapshot time-to-live.
    pub ttl: Duration,
}

impl CacheConfig {
    /// Creates a cache configuration.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>, remote: impl Into<String>, ttl: Duration) -> Self {
        Self {
            directory: directory.into(),
            remote: remote.into(),
            ttl,
        }
    }

    /// Path of the page tree.
    #[must_use]
    pub fn pages_dir(&self) -> PathBuf {
        self.directory.join(PAGES_DIR)
    }

    /// Path of the history file.
    #[must_use]
    pub fn history_path(&self) -> PathBuf {
        self.directory.join(HISTORY_FILE)
    }

    /// Path of the temporary archive.
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.directory.join(ARCHIVE_FILE)
    }
}

/// Read access to a set of pages grouped by platform.
pub trait Repository {
    /// Lists the platforms that have a page directory.
    fn available_platforms(&self) -> Result<Vec<String>>;

    /// Lists every page identifier across all platforms, sorted and de-duplicated.
    fn pages(&self) -> Result<Vec<String>>;

    /// Lists the page identifiers of one platform, sorted.
    fn platform_pages(&self, platform: &str) -> Result<Vec<String>>;

    /// Opens the markup of a page.
    fn markdown(&self, platform: &str, page: &str) -> Result<PageReader>;
}
