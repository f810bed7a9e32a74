//! Versioned cache bucket storage.
//!
//! A bucket is keyed by its cache version and maps normalized request URLs
//! to captured responses. Buckets are populated through a staging area that
//! becomes visible only when promoted, so readers never observe a partially
//! installed bucket.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::response::{CapturedResponse, ResponseMeta};

/// Abstraction over cache bucket storage for testability.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Lists the keys of all promoted buckets, in no particular order.
    async fn list_buckets(&self) -> Result<Vec<String>>;

    /// Returns `true` if a promoted bucket exists for `version`.
    async fn bucket_exists(&self, version: &str) -> Result<bool>;

    /// Creates a fresh, empty staging bucket for `version`, discarding any
    /// staging left behind by an earlier failed install.
    async fn create_staging(&self, version: &str) -> Result<()>;

    /// Stores a captured response into the staging bucket for `version`.
    async fn put_staged(&self, version: &str, response: CapturedResponse) -> Result<()>;

    /// Atomically promotes the staging bucket for `version`, replacing any
    /// promoted bucket of the same key.
    async fn promote(&self, version: &str) -> Result<()>;

    /// Removes the staging bucket for `version`, if present.
    async fn discard_staging(&self, version: &str) -> Result<()>;

    /// Looks up a captured response by normalized URL in the promoted
    /// bucket for `version`. Returns `None` on bucket or entry miss.
    async fn get(&self, version: &str, url: &str) -> Result<Option<CapturedResponse>>;

    /// Lists the normalized URLs stored in the promoted bucket for
    /// `version`.
    async fn list_entries(&self, version: &str) -> Result<Vec<String>>;

    /// Deletes the promoted bucket for `version`. Succeeds if the bucket is
    /// already absent.
    async fn delete_bucket(&self, version: &str) -> Result<()>;
}

const STAGING_SUFFIX: &str = ".staging";

/// Derives the on-disk file stem for a normalized URL.
fn entry_key(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Disk-backed cache store: one directory per bucket under a root path,
/// entries stored as a JSON metadata sidecar plus a raw body file.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Creates a store rooted at `root`. The directory is created lazily on
    /// first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the store's root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, version: &str) -> PathBuf {
        self.root.join(version)
    }

    fn staging_dir(&self, version: &str) -> PathBuf {
        self.root.join(format!("{version}{STAGING_SUFFIX}"))
    }

    fn meta_path(dir: &Path, url: &str) -> PathBuf {
        dir.join(format!("{}.json", entry_key(url)))
    }

    fn body_path(dir: &Path, url: &str) -> PathBuf {
        dir.join(format!("{}.body", entry_key(url)))
    }
}

#[async_trait]
impl CacheStore for DiskStore {
    async fn list_buckets(&self) -> Result<Vec<String>> {
        let mut buckets = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(buckets),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(STAGING_SUFFIX) {
                buckets.push(name);
            }
        }
        Ok(buckets)
    }

    async fn bucket_exists(&self, version: &str) -> Result<bool> {
        match tokio::fs::metadata(self.bucket_dir(version)).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_staging(&self, version: &str) -> Result<()> {
        let dir = self.staging_dir(version);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tokio::fs::create_dir_all(&dir).await?;
        Ok(())
    }

    async fn put_staged(&self, version: &str, response: CapturedResponse) -> Result<()> {
        let dir = self.staging_dir(version);
        let (meta, body) = response.into_parts();

        let meta_json = serde_json::to_vec(&meta)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        // Body first, meta last: the sidecar is what makes an entry visible
        // to readers.
        tokio::fs::write(Self::body_path(&dir, &meta.url), &body).await?;
        tokio::fs::write(Self::meta_path(&dir, &meta.url), &meta_json).await?;
        Ok(())
    }

    async fn promote(&self, version: &str) -> Result<()> {
        let staging = self.staging_dir(version);
        let live = self.bucket_dir(version);

        if tokio::fs::metadata(&staging).await.is_err() {
            return Err(Error::BucketMissing(format!("{version}{STAGING_SUFFIX}")));
        }

        match tokio::fs::remove_dir_all(&live).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tokio::fs::rename(&staging, &live).await?;
        Ok(())
    }

    async fn discard_staging(&self, version: &str) -> Result<()> {
        match tokio::fs::remove_dir_all(self.staging_dir(version)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, version: &str, url: &str) -> Result<Option<CapturedResponse>> {
        let dir = self.bucket_dir(version);

        let meta_bytes = match tokio::fs::read(Self::meta_path(&dir, url)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let meta: ResponseMeta =
            serde_json::from_slice(&meta_bytes).map_err(|e| Error::CorruptEntry {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let body = tokio::fs::read(Self::body_path(&dir, url)).await?;
        if body.len() as u64 != meta.body_len {
            return Err(Error::CorruptEntry {
                url: url.to_string(),
                reason: format!(
                    "body is {} bytes, sidecar records {}",
                    body.len(),
                    meta.body_len
                ),
            });
        }

        Ok(Some(CapturedResponse::from_parts(meta, body.into())))
    }

    async fn list_entries(&self, version: &str) -> Result<Vec<String>> {
        let dir = self.bucket_dir(version);
        let mut urls = Vec::new();

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::BucketMissing(version.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let meta_bytes = tokio::fs::read(&path).await?;
                let meta: ResponseMeta =
                    serde_json::from_slice(&meta_bytes).map_err(|e| Error::CorruptEntry {
                        url: path.display().to_string(),
                        reason: e.to_string(),
                    })?;
                urls.push(meta.url);
            }
        }

        urls.sort();
        Ok(urls)
    }

    async fn delete_bucket(&self, version: &str) -> Result<()> {
        match tokio::fs::remove_dir_all(self.bucket_dir(version)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
