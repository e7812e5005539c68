//! tldr
//!
//! A terminal client for tldr pages backed by a local, TTL-bounded cache of
//! the remote page archive.
//!
//! # Architecture
//!
//! - **Cache Module**: cache directory lifecycle, archive fetch and
//!   extraction, page listing and access history
//! - **Render Module**: page markup to colorized terminal text
//! - **Lookup Module**: finding a page across platforms
//! - **Config Module**: `.tldrrc` settings, cache root and platform resolution
//!
//! # Usage
//!
//! ```no_run
//! use tldr::cache::{CacheStore, Repository};
//! use tldr::config::Config;
//! use tldr::render::{MarkdownRenderer, Palette};
//!
//! let config = Config::load().expect("Failed to load config");
//! let store = CacheStore::open(config.cache_config().expect("No cache dir"))
//!     .expect("Failed to open cache");
//! let page = store.markdown("common", "tar").expect("No such page");
//! let text = MarkdownRenderer::new(Palette::plain())
//!     .render(std::io::BufReader::new(page))
//!     .expect("Failed to render");
//! print!("{}", text);
//! ```

// Clippy configuration - allow common patterns
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod lookup;
pub mod render;

// Re-export main types
pub use cache::{CacheConfig, CacheStore, HistoryRecord, HistoryTracker, Repository};
pub use config::Config;
pub use error::{Result, TldrError};
pub use render::{MarkdownRenderer, Palette};
