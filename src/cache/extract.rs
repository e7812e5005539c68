//! Archive extraction into the cache tree.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, TldrError};

/// Unpacks a zip archive into a destination directory.
#[derive(Debug, Default)]
pub struct ArchiveExtractor;

impl ArchiveExtractor {
    /// Creates an extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Extracts `archive` into `dest`, then deletes the archive.
    ///
    /// Returns the number of files written. A failure partway leaves whatever
    /// was already extracted in place.
    pub fn extract(&self, archive: &Path, dest: &Path) -> Result<usize> {
        let file = File::open(archive).map_err(|e| {
            TldrError::Extraction(format!("opening {}: {}", archive.display(), e))
        })?;
        let written = self.extract_from(file, dest)?;

        fs::remove_file(archive).map_err(|e| {
            TldrError::Extraction(format!("removing {}: {}", archive.display(), e))
        })?;

        info!("Extracted {} files into {}", written, dest.display());
        Ok(written)
    }

    /// Extracts every entry of a zip stream into `dest`.
    pub fn extract_from<R: io::Read + Seek>(&self, reader: R, dest: &Path) -> Result<usize> {
        let mut archive = zip::ZipArchive::new(reader)
            .map_err(|e| TldrError::Extraction(format!("failed to open archive: {}", e)))?;

        let mut written = 0;
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(|e| {
                TldrError::Extraction(format!("failed to read archive entry {}: {}", i, e))
            })?;

            let relative = entry.enclosed_name().ok_or_else(|| {
                TldrError::Extraction(format!("unsafe entry path: {}", entry.name()))
            })?;
            let outpath = dest.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&outpath).map_err(|e| write_error(&outpath, &e))?;
                continue;
            }

            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent).map_err(|e| write_error(parent, &e))?;
            }

            let mut outfile = create_with_mode(&outpath, entry.unix_mode())
                .map_err(|e| write_error(&outpath, &e))?;
            io::copy(&mut entry, &mut outfile).map_err(|e| write_error(&outpath, &e))?;
            written += 1;
        }

        debug!("Processed {} archive entries", archive.len());
        Ok(written)
    }
}

fn write_error(path: &Path, e: &io::Error) -> TldrError {
    TldrError::Extraction(format!("writing {}: {}", path.display(), e))
}

/// Creates (or truncates) a file carrying the entry's permission bits.
#[cfg(unix)]
fn create_with_mode(path: &Path, mode: Option<u32>) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    if let Some(mode) = mode {
        options.mode(mode & 0o7777);
    }
    options.open(path)
}

#[cfg(not(unix))]
fn create_with_mode(path: &Path, _mode: Option<u32>) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
