//! In-memory repository.
//!
//! Holds pages in a map so code written against [`Repository`] can run
//! without a cache directory.

use std::collections::BTreeMap;
use std::io::Cursor;

use super::{PageReader, Repository};
use crate::error::{Result, TldrError};

/// Pages keyed by platform, then by page name.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    platforms: BTreeMap<String, BTreeMap<String, String>>,
}

impl MemoryRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a page.
    pub fn insert(
        &mut self,
        platform: impl Into<String>,
        page: impl Into<String>,
        markdown: impl Into<String>,
    ) {
        self.platforms
            .entry(platform.into())
            .or_default()
            .insert(page.into(), markdown.into());
    }

    /// Builder form of [`MemoryRepository::insert`].
    #[must_use]
    pub fn with_page(
        mut self,
        platform: impl Into<String>,
        page: impl Into<String>,
        markdown: impl Into<String>,
    ) -> Self {
        self.insert(platform, page, markdown);
        self
    }
}

impl Repository for MemoryRepository {
    fn available_platforms(&self) -> Result<Vec<String>> {
        Ok(self.platforms.keys().cloned().collect())
    }

    fn pages(&self) -> Result<Vec<String>> {
        let mut pages: Vec<String> = self
            .platforms
            .values()
            .flat_map(|pages| pages.keys().cloned())
            .collect();
        pages.sort();
        pages.dedup();
        Ok(pages)
    }

    fn platform_pages(&self, platform: &str) -> Result<Vec<String>> {
        self.platforms
            .get(platform)
            .map(|pages| pages.keys().cloned().collect())
            .ok_or_else(|| TldrError::NotFound(platform.to_string()))
    }

    fn markdown(&self, platform: &str, page: &str) -> Result<PageReader> {
        self.platforms
            .get(platform)
            .and_then(|pages| pages.get(page))
            .map(|markdown| Box::new(Cursor::new(markdown.clone().into_bytes())) as PageReader)
            .ok_or_else(|| TldrError::NotFound(format!("{}/{}", platform, page)))
    }
}
