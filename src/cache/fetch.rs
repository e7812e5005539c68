//! Remote archive download.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, TldrError};

/// User agent sent with archive requests.
const USER_AGENT: &str = concat!("tldr-rs/", env!("CARGO_PKG_VERSION"));

/// Downloads the page archive with a single blocking GET.
pub struct RemoteFetcher {
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl Default for RemoteFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteFetcher {
    /// Creates a fetcher. Requests carry no timeout.
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(None)
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());

        Self { client }
    }

    /// Streams the body at `url` into `dest`, truncating any existing file.
    ///
    /// Returns the number of bytes written.
    pub fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        info!("Fetching pages from {}", url);

        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| TldrError::Network(format!("request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(TldrError::Network(format!(
                "{} responded with {}",
                url,
                response.status()
            )));
        }

        let file = File::create(dest)?;
        let mut writer = BufWriter::new(file);
        let written = io::copy(&mut response, &mut writer).map_err(|e| {
            TldrError::Network(format!("reading response body from {}: {}", url, e))
        })?;
        writer.flush()?;

        debug!("Wrote {} bytes to {}", written, dest.display());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_refused_connection_is_network_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("tldr.zip");

        let err = RemoteFetcher::new()
            .fetch("http://127.0.0.1:1/tldr.zip", &dest)
            .unwrap_err();

        assert!(matches!(err, TldrError::Network(_)), "got {:?}", err);
        assert!(!dest.exists(), "no archive file on a failed request");
    }

    #[test]
    fn test_fetch_invalid_url_is_network_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("tldr.zip");

        let err = RemoteFetcher::new().fetch("not a url", &dest).unwrap_err();
        assert!(matches!(err, TldrError::Network(_)));
    }
}
