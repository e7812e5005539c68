//! Page lookup across platforms.

use tracing::debug;

use crate::cache::{PageReader, Repository};
use crate::config::PlatformResolver;
use crate::error::{Result, TldrError};

/// A page found by [`find_page`].
pub struct FoundPage {
    /// Platform the page was found under.
    pub platform: String,
    /// Open stream over the page markup.
    pub reader: PageReader,
}

/// Opens `page` under the current platform, then under each fallback.
///
/// Errors other than `NotFound` stop the search.
pub fn find_page<R, P>(repo: &R, resolver: &P, page: &str) -> Result<FoundPage>
where
    R: Repository + ?Sized,
    P: PlatformResolver + ?Sized,
{
    let current = resolver.current();
    match repo.markdown(current, page) {
        Ok(reader) => {
            return Ok(FoundPage {
                platform: current.to_string(),
                reader,
            });
        }
        Err(e) if e.is_not_found() => debug!("{} not found under {}", page, current),
        Err(e) => return Err(e),
    }

    let available = repo.available_platforms()?;
    for platform in resolver.fallbacks(&available) {
        match repo.markdown(&platform, page) {
            Ok(reader) => return Ok(FoundPage { platform, reader }),
            Err(e) if e.is_not_found() => continue,
            Err(e) => return Err(e),
        }
    }

    Err(TldrError::NotFound(format!(
        "no page found for '{}' in any available platform",
        page
    )))
}
