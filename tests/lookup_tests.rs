//! Integration tests for cross-platform page lookup.
//!
//! These tests run against the in-memory repository so no cache directory
//! or network access is needed.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Read;

use pretty_assertions::assert_eq;
use tldr::cache::{MemoryRepository, PageReader, Repository};
use tldr::config::SystemPlatform;
use tldr::lookup::find_page;
use tldr::{Result, TldrError};

fn repository() -> MemoryRepository {
    MemoryRepository::new()
        .with_page("common", "tar", "# tar (common)")
        .with_page("linux", "tar", "# tar (linux)")
        .with_page("linux", "apt", "# apt")
        .with_page("osx", "brew", "# brew")
}

fn content(mut reader: PageReader) -> String {
    let mut text = String::new();
    reader.read_to_string(&mut text).unwrap();
    text
}

#[test]
fn test_current_platform_wins() {
    let found = find_page(&repository(), &SystemPlatform::named("linux"), "tar").unwrap();
    assert_eq!(found.platform, "linux");
    assert_eq!(content(found.reader), "# tar (linux)");
}

#[test]
fn test_falls_back_to_common() {
    let found = find_page(&repository(), &SystemPlatform::named("Darwin"), "tar").unwrap();
    assert_eq!(found.platform, "common");
    assert_eq!(content(found.reader), "# tar (common)");
}

#[test]
fn test_falls_back_to_other_platform() {
    let found = find_page(&repository(), &SystemPlatform::named("linux"), "brew").unwrap();
    assert_eq!(found.platform, "osx");
    assert_eq!(content(found.reader), "# brew");
}

#[test]
fn test_missing_everywhere_is_not_found() {
    let result = find_page(&repository(), &SystemPlatform::named("linux"), "nonexistent");
    match result {
        Err(TldrError::NotFound(message)) => assert!(message.contains("nonexistent")),
        Err(e) => panic!("unexpected error: {:?}", e),
        Ok(found) => panic!("unexpectedly found under {}", found.platform),
    }
}

/// Repository whose platform listing always fails.
struct BrokenListing;

impl Repository for BrokenListing {
    fn available_platforms(&self) -> Result<Vec<String>> {
        Err(TldrError::Configuration("listing unavailable".to_string()))
    }

    fn pages(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn platform_pages(&self, platform: &str) -> Result<Vec<String>> {
        Err(TldrError::NotFound(platform.to_string()))
    }

    fn markdown(&self, platform: &str, page: &str) -> Result<PageReader> {
        Err(TldrError::NotFound(format!("{}/{}", platform, page)))
    }
}

#[test]
fn test_other_errors_stop_the_search() {
    let result = find_page(&BrokenListing, &SystemPlatform::named("linux"), "tar");
    assert!(matches!(result, Err(TldrError::Configuration(_))));
}
