//! Deploy-time artifact generation.
//!
//! The generator emits data, not code: `sw-config.toml` is the serialized
//! [`CacheConfig`](crate::CacheConfig) the runtime loads back, and
//! `build-info.json` stamps the deploy. The cache lifecycle logic itself
//! lives only in [`controller`](crate::controller).

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::CacheConfig;
use crate::error::{Error, Result};

/// File name of the serialized cache configuration artifact.
pub const SW_CONFIG_FILE: &str = "sw-config.toml";

/// File name of the build stamp artifact.
pub const BUILD_INFO_FILE: &str = "build-info.json";

/// Metadata stamped into every generated deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    /// When the artifacts were generated.
    pub generated_at: DateTime<Utc>,
    /// Version of the generator crate.
    pub generator_version: String,
    /// Cache version the artifacts describe.
    pub cache_version: String,
    /// Number of assets in the precache manifest.
    pub asset_count: usize,
}

impl BuildInfo {
    /// Creates a build stamp for the given configuration.
    #[must_use]
    pub fn for_config(config: &CacheConfig) -> Self {
        Self {
            generated_at: Utc::now(),
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            cache_version: config.version.clone(),
            asset_count: config.manifest.len(),
        }
    }
}

/// Paths of the artifacts written by [`write_artifacts`].
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    /// The serialized cache configuration.
    pub sw_config: PathBuf,
    /// The build stamp.
    pub build_info: PathBuf,
}

/// Writes the deploy artifacts for `config` into `out_dir`, creating the
/// directory if needed. Files are written atomically (tmp + rename) so a
/// crashed generation never leaves a half-written artifact behind.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or a file cannot be
/// serialized or written.
pub fn write_artifacts(config: &CacheConfig, out_dir: &Path) -> Result<ArtifactPaths> {
    fs::create_dir_all(out_dir)?;

    let sw_config = out_dir.join(SW_CONFIG_FILE);
    write_atomic(&sw_config, config.to_toml()?.as_bytes())?;

    let build_info = out_dir.join(BUILD_INFO_FILE);
    let stamp = serde_json::to_vec_pretty(&BuildInfo::for_config(config))
        .map_err(|e| Error::Config(e.to_string()))?;
    write_atomic(&build_info, &stamp)?;

    log::info!(
        "generated {} and {} for {}",
        SW_CONFIG_FILE,
        BUILD_INFO_FILE,
        config.version
    );

    Ok(ArtifactPaths {
        sw_config,
        build_info,
    })
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn artifacts_round_trip() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dist");
        let config = CacheConfig::default();

        let paths = write_artifacts(&config, &out).unwrap();
        assert_eq!(paths.sw_config, out.join(SW_CONFIG_FILE));
        assert_eq!(paths.build_info, out.join(BUILD_INFO_FILE));

        let loaded = CacheConfig::load(&paths.sw_config).unwrap();
        assert_eq!(loaded, config);

        let stamp: BuildInfo =
            serde_json::from_str(&std::fs::read_to_string(&paths.build_info).unwrap()).unwrap();
        assert_eq!(stamp.cache_version, config.version);
        assert_eq!(stamp.asset_count, config.manifest.len());
    }

    #[test]
    fn regeneration_overwrites_cleanly() {
        let dir = TempDir::new().unwrap();
        let config = CacheConfig::default();

        write_artifacts(&config, dir.path()).unwrap();

        let mut updated = config.clone();
        updated.version = "pixelforge-v1.0.1".to_string();
        write_artifacts(&updated, dir.path()).unwrap();

        let loaded = CacheConfig::load(&dir.path().join(SW_CONFIG_FILE)).unwrap();
        assert_eq!(loaded.version, "pixelforge-v1.0.1");

        // No tmp litter left behind.
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().all(|n| !n.ends_with(".tmp")));
    }

    #[test]
    fn build_info_stamps_generator_version() {
        let stamp = BuildInfo::for_config(&CacheConfig::default());
        assert_eq!(stamp.generator_version, env!("CARGO_PKG_VERSION"));
    }
}
