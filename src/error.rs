//! Error types for the forgecache library.

use thiserror::Error;

/// Errors that can occur during cache lifecycle operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error during cache storage operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An asset fetch completed but returned a non-success status.
    #[error("asset fetch for {url} returned status {status}")]
    AssetStatus {
        /// URL of the asset that was fetched.
        url: String,
        /// The non-success HTTP status code.
        status: u16,
    },

    /// A manifest entry could not be precached, failing the whole install.
    #[error("precache of {url} failed: {source}")]
    Precache {
        /// Manifest URL whose fetch or store failed.
        url: String,
        /// The underlying fetch or storage error.
        source: Box<Error>,
    },

    /// A named cache bucket does not exist.
    #[error("cache bucket not found: {0}")]
    BucketMissing(String),

    /// A stored cache entry could not be decoded.
    #[error("cache entry for {url} is corrupt: {reason}")]
    CorruptEntry {
        /// URL key of the unreadable entry.
        url: String,
        /// Description of what failed to decode.
        reason: String,
    },

    /// The asset manifest does not include the root document.
    #[error("asset manifest must include the root document \"/\"")]
    ManifestMissingRoot,

    /// Configuration parsing or serialization failed.
    #[error("config error: {0}")]
    Config(String),
}

/// A specialized `Result` type for forgecache operations.
pub type Result<T> = std::result::Result<T, Error>;
