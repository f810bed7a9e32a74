//! Cache controller configuration.
//!
//! `CacheConfig` is the single authoritative parameter set for the cache
//! lifecycle: the deploy-time generator serializes it to `sw-config.toml`
//! and the runtime deserializes the same struct, so version and manifest can
//! never diverge between the two.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::manifest::AssetManifest;

/// Configuration for a cache controller instance.
///
/// The version string names exactly one cache bucket and must change
/// whenever the manifest changes; otherwise activation will not evict stale
/// entries for changed-but-same-named assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Version tag naming the current cache bucket.
    pub version: String,
    /// Assets fetched and stored at install time.
    pub manifest: AssetManifest,
    /// Number of concurrent precache fetches during install.
    pub concurrent_fetches: usize,
    /// Whether a failed install removes its staging bucket.
    pub cleanup_on_error: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let manifest = AssetManifest::new([
            "/",
            "/about.html",
            "/contact.html",
            "/assets/css/custom.css",
            "/assets/js/content-manager.js",
            "/assets/js/script.js",
            "/assets/js/data.js",
            "https://cdn.jsdelivr.net/npm/bootstrap@5.3.2/dist/css/bootstrap.min.css",
            "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css",
        ])
        .expect("default manifest includes the root document");

        Self {
            version: "pixelforge-v1.0.0".to_string(),
            manifest,
            concurrent_fetches: 4,
            cleanup_on_error: true,
        }
    }
}

impl CacheConfig {
    /// Creates a configuration for the given version and manifest.
    #[must_use]
    pub fn new(version: impl Into<String>, manifest: AssetManifest) -> Self {
        Self {
            version: version.into(),
            manifest,
            ..Self::default()
        }
    }

    /// Sets the number of concurrent precache fetches.
    #[must_use]
    pub const fn with_concurrent_fetches(mut self, concurrent: usize) -> Self {
        self.concurrent_fetches = concurrent;
        self
    }

    /// Sets whether a failed install removes its staging bucket.
    #[must_use]
    pub const fn with_cleanup_on_error(mut self, cleanup: bool) -> Self {
        self.cleanup_on_error = cleanup;
        self
    }

    /// Loads a configuration from a TOML file written by the generator.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse as a
    /// valid configuration (including a manifest missing the root document).
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| Error::Config(e.to_string()))
    }

    /// Serializes the configuration to the TOML artifact format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}
