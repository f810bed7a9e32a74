//! forgecache - a versioned offline asset cache controller.
//!
//! This library manages one named, versioned bucket of precached site
//! assets: it populates the bucket from a fixed manifest at install time,
//! evicts stale version buckets at activation, and answers intercepted
//! fetches cache-first with an offline shell fallback for navigations.
//!
//! # Example
//!
//! ```no_run
//! use forgecache::{
//!     AssetRequest, CacheConfig, CacheController, DiskStore, HttpFetcher, NoEvents,
//! };
//!
//! # async fn example() -> forgecache::Result<()> {
//! let config = CacheConfig::default();
//! let store = DiskStore::new("dist/cache");
//! let fetcher = HttpFetcher::new("https://pixelforge.com")?;
//!
//! let controller = CacheController::new(config, store, fetcher);
//!
//! // Precache the manifest, then cut over to this version.
//! controller.install(&NoEvents).await?;
//! controller.activate(&NoEvents).await?;
//!
//! // Serve an intercepted navigation cache-first.
//! let response = controller.intercept(&AssetRequest::navigation("/")).await?;
//! println!("{} bytes from cache", response.body.len());
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod format;
pub mod generate;
pub mod manifest;
pub mod request;
pub mod response;
pub mod store;

// Re-export main types for convenience
pub use config::CacheConfig;
pub use controller::{ActivationReport, CacheController, InstallReport, LifecycleState};
pub use error::{Error, Result};
pub use events::{CacheEvents, NoEvents};
pub use fetcher::{HttpFetcher, NetworkFetcher};
pub use format::{format_bytes, format_duration};
pub use generate::{ArtifactPaths, BuildInfo, write_artifacts};
pub use manifest::AssetManifest;
pub use request::{AssetRequest, RequestDestination, normalize_url};
pub use response::{CapturedResponse, ResponseMeta};
pub use store::{CacheStore, DiskStore};
