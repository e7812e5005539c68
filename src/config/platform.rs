//! Platform detection utilities.
//!
//! Maps the running operating system to a page platform name and decides
//! which other platforms to search when a page is missing.

/// Platform holding pages that apply everywhere.
pub const COMMON_PLATFORM: &str = "common";

/// Supplies the platform to look in first and where to look next.
pub trait PlatformResolver {
    /// Platform of the invoking system.
    fn current(&self) -> &str;

    /// Platforms to probe, in order, after the current one.
    fn fallbacks(&self, available: &[String]) -> Vec<String>;
}

/// Normalizes an operating system name to a page platform name.
#[must_use]
pub fn normalize_platform(name: &str) -> String {
    match name.to_lowercase().as_str() {
        "darwin" | "macos" => "osx".to_string(),
        other => other.to_string(),
    }
}

/// Returns the platform name of the running system.
#[must_use]
pub fn current_platform() -> String {
    normalize_platform(std::env::consts::OS)
}

/// Resolver for a fixed platform, by default the running system's.
#[derive(Debug, Clone)]
pub struct SystemPlatform {
    name: String,
}

impl Default for SystemPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemPlatform {
    /// Resolver for the running system.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: current_platform(),
        }
    }

    /// Resolver for an explicitly named platform.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: normalize_platform(name),
        }
    }
}

impl PlatformResolver for SystemPlatform {
    fn current(&self) -> &str {
        &self.name
    }

    /// `common` first, then every other available platform.
    fn fallbacks(&self, available: &[String]) -> Vec<String> {
        let mut platforms = Vec::with_capacity(available.len() + 1);
        if self.name != COMMON_PLATFORM {
            platforms.push(COMMON_PLATFORM.to_string());
        }
        platforms.extend(
            available
                .iter()
                .filter(|p| **p != self.name && p.as_str() != COMMON_PLATFORM)
                .cloned(),
        );
        platforms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_platform() {
        assert_eq!(normalize_platform("linux"), "linux");
        assert_eq!(normalize_platform("LINUX"), "linux");
        assert_eq!(normalize_platform("darwin"), "osx");
        assert_eq!(normalize_platform("DARWIN"), "osx");
        assert_eq!(normalize_platform("macos"), "osx");
        assert_eq!(normalize_platform("SUNOS"), "sunos");
        assert_eq!(normalize_platform("windows"), "windows");
    }

    #[test]
    fn test_current_platform_not_empty() {
        assert!(!current_platform().is_empty());
    }

    #[test]
    fn test_fallbacks() {
        let available: Vec<String> = ["common", "linux", "osx", "windows"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(
            SystemPlatform::named("linux").fallbacks(&available),
            vec!["common", "osx", "windows"]
        );
        assert_eq!(
            SystemPlatform::named("stuff").fallbacks(&available),
            vec!["common", "linux", "osx", "windows"]
        );
        assert_eq!(
            SystemPlatform::named("common").fallbacks(&available),
            vec!["linux", "osx", "windows"]
        );
    }
}
