//! Cache lifecycle controller: install, activate, intercept.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use futures::{StreamExt, stream};

use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::events::CacheEvents;
use crate::fetcher::{HttpFetcher, NetworkFetcher};
use crate::request::AssetRequest;
use crate::response::CapturedResponse;
use crate::store::{CacheStore, DiskStore};

/// Lifecycle states of a cache controller.
///
/// Transitions are driven by the host's lifecycle events; the controller
/// records the state it was driven into but never advances on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No install has run for this controller instance.
    Uninstalled,
    /// Precaching the manifest into a staging bucket.
    Installing,
    /// Precache complete and promoted, waiting for activation.
    Installed,
    /// Evicting stale buckets.
    Activating,
    /// Activation complete; this version serves interceptions.
    Active,
}

impl LifecycleState {
    /// Returns `true` once activation has completed.
    #[must_use]
    pub const fn can_intercept(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninstalled => write!(f, "uninstalled"),
            Self::Installing => write!(f, "installing"),
            Self::Installed => write!(f, "installed"),
            Self::Activating => write!(f, "activating"),
            Self::Active => write!(f, "active"),
        }
    }
}

/// Result of a successful install.
#[derive(Debug, Clone)]
pub struct InstallReport {
    /// Version of the bucket that was populated and promoted.
    pub version: String,
    /// Number of manifest assets cached.
    pub assets_cached: usize,
    /// Total body bytes cached.
    pub bytes_cached: u64,
    /// Wall-clock time for the whole precache.
    pub elapsed: Duration,
    /// Signal to the host to skip the waiting period and activate this
    /// version immediately, accepting brief version skew across open pages.
    pub skip_waiting: bool,
}

/// Result of an activation pass.
#[derive(Debug, Clone)]
pub struct ActivationReport {
    /// The version left as the single promoted bucket.
    pub version: String,
    /// Stale bucket keys that were evicted.
    pub evicted: Vec<String>,
    /// Stale bucket keys whose eviction failed; retried on the next
    /// activation, not within this pass.
    pub failed: Vec<String>,
}

/// Controller for one versioned cache bucket.
///
/// Owns the bucket named by its configured version: precaches the manifest
/// at install, evicts every other bucket at activation, and answers
/// intercepted fetches cache-first. Multiple controllers over the same store
/// model the old-generation/new-generation coexistence window.
pub struct CacheController<S: CacheStore = DiskStore, N: NetworkFetcher = HttpFetcher> {
    config: CacheConfig,
    store: S,
    fetcher: N,
    state: Mutex<LifecycleState>,
}

impl<S: CacheStore, N: NetworkFetcher> CacheController<S, N> {
    /// Creates a controller over the given store and fetcher.
    pub fn new(config: CacheConfig, store: S, fetcher: N) -> Self {
        Self {
            config,
            store,
            fetcher,
            state: Mutex::new(LifecycleState::Uninstalled),
        }
    }

    /// Returns the controller's configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the version tag this controller serves.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.config.version
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        *self.state.lock().expect("state lock")
    }

    fn set_state(&self, state: LifecycleState) {
        *self.state.lock().expect("state lock") = state;
    }

    /// Precaches every manifest asset into a staging bucket for this
    /// controller's version, then promotes it atomically.
    ///
    /// All fetches run with bounded concurrency and the handler does not
    /// return until every one has settled. A single failure fails the whole
    /// install: nothing is promoted and the staging bucket is discarded, so
    /// a previously promoted version keeps serving untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Precache`] naming the first asset whose fetch or
    /// store failed, or the storage error that prevented staging.
    pub async fn install(&self, events: &dyn CacheEvents) -> Result<InstallReport> {
        let version = &self.config.version;
        let started = Instant::now();

        self.set_state(LifecycleState::Installing);
        log::info!("installing cache bucket {version}");

        if let Err(e) = self.store.create_staging(version).await {
            self.set_state(LifecycleState::Uninstalled);
            return Err(e);
        }
        events.on_install_start(version, self.config.manifest.len());

        let results: Vec<Result<u64>> = stream::iter(self.config.manifest.iter())
            .map(|url| async move {
                match self.precache_one(url).await {
                    Ok(bytes) => {
                        events.on_asset_cached(url, bytes);
                        Ok(bytes)
                    }
                    Err(e) => {
                        events.on_asset_failed(url, &e.to_string());
                        Err(Error::Precache {
                            url: url.to_string(),
                            source: Box::new(e),
                        })
                    }
                }
            })
            .buffer_unordered(self.config.concurrent_fetches.max(1))
            .collect()
            .await;

        let mut bytes_cached = 0u64;
        let mut first_error = None;
        for result in results {
            match result {
                Ok(bytes) => bytes_cached += bytes,
                Err(e) => {
                    log::error!("install of {version} failed: {e}");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if let Some(e) = first_error {
            if self.config.cleanup_on_error {
                let _ = self.store.discard_staging(version).await;
            }
            self.set_state(LifecycleState::Uninstalled);
            return Err(e);
        }

        if let Err(e) = self.store.promote(version).await {
            if self.config.cleanup_on_error {
                let _ = self.store.discard_staging(version).await;
            }
            self.set_state(LifecycleState::Uninstalled);
            return Err(e);
        }
        self.set_state(LifecycleState::Installed);
        events.on_installed(version);
        log::info!(
            "installed {version}: {} assets, {bytes_cached} bytes",
            self.config.manifest.len()
        );

        Ok(InstallReport {
            version: version.clone(),
            assets_cached: self.config.manifest.len(),
            bytes_cached,
            elapsed: started.elapsed(),
            skip_waiting: true,
        })
    }

    /// Fetches one manifest asset and stages it. Non-success statuses are
    /// install failures: a 404 page must never be promoted as an asset.
    async fn precache_one(&self, url: &str) -> Result<u64> {
        let response = self.fetcher.fetch(url).await?;
        if !response.is_success() {
            return Err(Error::AssetStatus {
                url: url.to_string(),
                status: response.status,
            });
        }
        let bytes = response.body.len() as u64;
        self.store.put_staged(&self.config.version, response).await?;
        Ok(bytes)
    }

    /// Evicts every promoted bucket whose key differs from this
    /// controller's version, then marks the controller active.
    ///
    /// Evictions run independently; one failure is logged, reported, and
    /// left for the next activation without blocking the others or the
    /// transition to [`LifecycleState::Active`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the bucket enumeration itself fails.
    pub async fn activate(&self, events: &dyn CacheEvents) -> Result<ActivationReport> {
        let version = &self.config.version;

        self.set_state(LifecycleState::Activating);
        log::info!("activating cache bucket {version}");

        let stale: Vec<String> = self
            .store
            .list_buckets()
            .await?
            .into_iter()
            .filter(|key| key != version)
            .collect();

        let results: Vec<(String, Result<()>)> = stream::iter(stale)
            .map(|key| async move {
                let result = self.store.delete_bucket(&key).await;
                (key, result)
            })
            .buffer_unordered(self.config.concurrent_fetches.max(1))
            .collect()
            .await;

        let mut evicted = Vec::new();
        let mut failed = Vec::new();
        for (key, result) in results {
            match result {
                Ok(()) => {
                    events.on_bucket_evicted(&key);
                    evicted.push(key);
                }
                Err(e) => {
                    log::warn!("failed to evict stale bucket {key}: {e}");
                    events.on_eviction_failed(&key, &e.to_string());
                    failed.push(key);
                }
            }
        }

        self.set_state(LifecycleState::Active);
        events.on_activated(version);

        Ok(ActivationReport {
            version: version.clone(),
            evicted,
            failed,
        })
    }

    /// Answers an intercepted fetch: cache-first, network fallback, offline
    /// shell for navigations.
    ///
    /// A cache hit is returned with no network round-trip and no
    /// revalidation; content changes only land with the next installed
    /// version. A miss is fetched live and returned as-is without being
    /// written back. If the live fetch fails, navigations receive the
    /// cached root document; all other requests surface the failure.
    ///
    /// # Errors
    ///
    /// Returns the live fetch error when there is no cache entry and no
    /// applicable offline fallback.
    pub async fn intercept(&self, request: &AssetRequest) -> Result<CapturedResponse> {
        let key = request.match_key();
        let version = &self.config.version;

        if !self.state().can_intercept() {
            log::debug!("intercept for {key} while {}", self.state());
        }

        match self.store.get(version, &key).await {
            Ok(Some(hit)) => {
                log::debug!("cache hit: {key}");
                return Ok(hit);
            }
            Ok(None) => {}
            // An unreadable entry degrades to a miss rather than failing
            // the request.
            Err(e) => log::warn!("cache read for {key} failed: {e}"),
        }

        match self.fetcher.fetch(&key).await {
            Ok(response) => Ok(response),
            Err(e) => {
                if request.destination.is_navigation() {
                    if let Ok(Some(shell)) = self.store.get(version, "/").await {
                        log::debug!("offline fallback for {key}");
                        return Ok(shell);
                    }
                }
                Err(e)
            }
        }
    }
}
