//! The build-time list of asset URLs to precache.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::request::normalize_url;

/// Ordered sequence of asset URLs fetched and stored at install time.
///
/// Entries are normalized and deduplicated preserving first-seen order, and
/// the root document `/` must be present: it is the substitute shell served
/// to offline navigations. The manifest is fixed at build time and immutable
/// for the lifetime of a controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct AssetManifest {
    entries: Vec<String>,
}

impl AssetManifest {
    /// Builds a manifest from raw URL entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestMissingRoot`] if no entry normalizes to `/`.
    pub fn new<I, S>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for entry in raw {
            let url = normalize_url(entry.as_ref());
            if seen.insert(url.clone()) {
                entries.push(url);
            }
        }

        if !entries.iter().any(|e| e == "/") {
            return Err(Error::ManifestMissingRoot);
        }

        Ok(Self { entries })
    }

    /// Returns the normalized entries in manifest order.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the manifest has no entries.
    ///
    /// A constructed manifest always contains at least the root document, so
    /// this is only `false` in practice; it exists for completeness of the
    /// collection surface.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if the manifest contains the normalized form of `url`.
    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        let key = normalize_url(url);
        self.entries.iter().any(|e| *e == key)
    }

    /// Iterates over the normalized entries in manifest order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for AssetManifest {
    type Error = Error;

    fn try_from(raw: Vec<String>) -> Result<Self> {
        Self::new(raw)
    }
}

impl From<AssetManifest> for Vec<String> {
    fn from(manifest: AssetManifest) -> Self {
        manifest.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_order() {
        let manifest =
            AssetManifest::new(["/", "/about.html", "/contact.html"]).unwrap();
        assert_eq!(
            manifest.entries(),
            ["/", "/about.html", "/contact.html"]
        );
    }

    #[test]
    fn deduplicates_first_seen() {
        let manifest =
            AssetManifest::new(["/", "/a.css", "/", "/a.css", "/b.js"]).unwrap();
        assert_eq!(manifest.entries(), ["/", "/a.css", "/b.js"]);
    }

    #[test]
    fn normalizes_entries() {
        let manifest = AssetManifest::new(["/", "about.html", "/x.css#v2"]).unwrap();
        assert_eq!(manifest.entries(), ["/", "/about.html", "/x.css"]);
    }

    #[test]
    fn duplicate_after_normalization_collapses() {
        let manifest = AssetManifest::new(["/", "about.html", "/about.html"]).unwrap();
        assert_eq!(manifest.entries(), ["/", "/about.html"]);
    }

    #[test]
    fn missing_root_is_rejected() {
        let err = AssetManifest::new(["/about.html", "/x.css"]).unwrap_err();
        assert!(matches!(err, Error::ManifestMissingRoot));
    }

    #[test]
    fn empty_manifest_is_rejected() {
        let err = AssetManifest::new(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, Error::ManifestMissingRoot));
    }

    #[test]
    fn contains_matches_normalized() {
        let manifest = AssetManifest::new(["/", "/about.html"]).unwrap();
        assert!(manifest.contains("about.html"));
        assert!(manifest.contains("/about.html#team"));
        assert!(!manifest.contains("/missing.html"));
    }

    #[test]
    fn cdn_urls_survive_untouched() {
        let cdn = "https://cdn.jsdelivr.net/npm/bootstrap@5.3.2/dist/css/bootstrap.min.css";
        let manifest = AssetManifest::new(["/", cdn]).unwrap();
        assert_eq!(manifest.entries()[1], cdn);
    }

    #[test]
    fn serde_round_trip() {
        let manifest = AssetManifest::new(["/", "/about.html", "/x.css"]).unwrap();
        let json = serde_json::to_string(&manifest).unwrap();
        let back: AssetManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, manifest);
    }

    #[test]
    fn deserialization_revalidates() {
        let err = serde_json::from_str::<AssetManifest>(r#"["/about.html"]"#);
        assert!(err.is_err());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn construction_is_idempotent(
                urls in proptest::collection::vec("[a-z/.]{1,12}", 0..8)
            ) {
                let mut with_root = vec!["/".to_string()];
                with_root.extend(urls);

                let once = AssetManifest::new(&with_root).unwrap();
                let twice = AssetManifest::new(once.entries()).unwrap();
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn entries_are_unique(
                urls in proptest::collection::vec("[a-z/.]{1,12}", 0..8)
            ) {
                let mut with_root = vec!["/".to_string()];
                with_root.extend(urls);

                let manifest = AssetManifest::new(&with_root).unwrap();
                let set: HashSet<_> = manifest.iter().collect();
                prop_assert_eq!(set.len(), manifest.len());
            }
        }
    }
}
