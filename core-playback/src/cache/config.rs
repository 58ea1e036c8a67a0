//! Cache configuration and manifest resolution

use serde::{Deserialize, Serialize};

/// Generation name used when none is configured.
pub const DEFAULT_GENERATION: &str = "baby-song-cache-v1";

/// Configuration for the offline asset cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Name of the current cache generation (bucket)
    pub generation: String,

    /// Assets fetched and stored at install time
    pub manifest: Vec<String>,

    /// Optional origin prefixed to origin-relative manifest paths
    pub origin: Option<String>,

    /// File extensions routed through the media policy (without the dot)
    pub media_extensions: Vec<String>,

    /// Activate immediately after a successful install (default: true)
    pub skip_waiting: bool,

    /// Take control of already-open clients on activation (default: true)
    pub claim_clients: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            generation: DEFAULT_GENERATION.to_string(),
            manifest: [
                "/",
                "/index.html",
                "/images/cover.jpeg",
                "/songs/amma1.mp3",
                "/songs/thaththa1.m4a",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            origin: None,
            media_extensions: ["mp3", "m4a", "wav", "ogg", "opus"]
                .into_iter()
                .map(String::from)
                .collect(),
            skip_waiting: true,
            claim_clients: true,
        }
    }
}

impl CacheConfig {
    /// Create a new cache configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the generation name.
    pub fn with_generation(mut self, generation: impl Into<String>) -> Self {
        self.generation = generation.into();
        self
    }

    /// Replace the install manifest.
    pub fn with_manifest<I, S>(mut self, manifest: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manifest = manifest.into_iter().map(Into::into).collect();
        self
    }

    /// Set the origin used to resolve manifest paths.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Replace the media extension list.
    pub fn with_media_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.media_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable activation right after install.
    pub fn with_skip_waiting(mut self, enabled: bool) -> Self {
        self.skip_waiting = enabled;
        self
    }

    /// Enable or disable claiming open clients on activation.
    pub fn with_claim_clients(mut self, enabled: bool) -> Self {
        self.claim_clients = enabled;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.generation.trim().is_empty() {
            return Err("generation cannot be empty".to_string());
        }

        if self.manifest.is_empty() {
            return Err("manifest must list at least one asset".to_string());
        }

        if self.manifest.iter().any(|entry| entry.is_empty()) {
            return Err("manifest cannot contain empty entries".to_string());
        }

        if self
            .media_extensions
            .iter()
            .any(|ext| ext.is_empty() || ext.starts_with('.'))
        {
            return Err("media_extensions must be bare, non-empty extensions".to_string());
        }

        Ok(())
    }

    /// Absolute URL for a manifest path.
    ///
    /// Paths starting with `/` are prefixed with the origin when one is
    /// configured; everything else is returned unchanged.
    pub fn resolve(&self, path: &str) -> String {
        match &self.origin {
            Some(origin) if path.starts_with('/') => {
                format!("{}{}", origin.trim_end_matches('/'), path)
            }
            _ => path.to_string(),
        }
    }

    /// Resolved URLs of every manifest entry, in manifest order.
    pub fn resolved_manifest(&self) -> Vec<String> {
        self.manifest.iter().map(|path| self.resolve(path)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.generation, "baby-song-cache-v1");
        assert_eq!(config.manifest.len(), 5);
        assert_eq!(config.media_extensions.len(), 5);
        assert!(config.skip_waiting);
        assert!(config.claim_clients);
    }

    #[test]
    fn test_config_builder() {
        let config = CacheConfig::new()
            .with_generation("lullaby-v2")
            .with_manifest(["/", "/a.mp3"])
            .with_origin("https://lullaby.example/")
            .with_media_extensions(["flac"])
            .with_skip_waiting(false)
            .with_claim_clients(false);

        assert_eq!(config.generation, "lullaby-v2");
        assert_eq!(config.manifest, vec!["/".to_string(), "/a.mp3".to_string()]);
        assert_eq!(config.media_extensions, vec!["flac".to_string()]);
        assert!(!config.skip_waiting);
        assert!(!config.claim_clients);
    }

    #[test]
    fn test_config_validation() {
        assert!(CacheConfig::default().with_generation(" ").validate().is_err());
        assert!(CacheConfig::default()
            .with_manifest(Vec::<String>::new())
            .validate()
            .is_err());
        assert!(CacheConfig::default().with_manifest([""]).validate().is_err());
        assert!(CacheConfig::default()
            .with_media_extensions([".mp3"])
            .validate()
            .is_err());
    }

    #[test]
    fn test_resolve() {
        let config = CacheConfig::default().with_origin("https://lullaby.example/");
        assert_eq!(config.resolve("/index.html"), "https://lullaby.example/index.html");
        assert_eq!(config.resolve("/"), "https://lullaby.example/");
        assert_eq!(
            config.resolve("https://cdn.example/a.mp3"),
            "https://cdn.example/a.mp3"
        );
        assert_eq!(CacheConfig::default().resolve("/index.html"), "/index.html");
        assert_eq!(config.resolved_manifest().len(), 5);
    }
}
