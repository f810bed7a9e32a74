//! Intercepted request representation and URL match-key normalization.

/// What kind of resource a request is for.
///
/// Only [`Document`](RequestDestination::Document) requests are eligible for
/// the offline shell fallback; every other destination surfaces fetch
/// failures unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDestination {
    /// A full-page navigation.
    Document,
    /// A stylesheet.
    Style,
    /// A script.
    Script,
    /// An image.
    Image,
    /// A font file.
    Font,
    /// Any other sub-resource.
    Other,
}

impl RequestDestination {
    /// Returns `true` for full-page navigations.
    #[must_use]
    pub const fn is_navigation(self) -> bool {
        matches!(self, Self::Document)
    }
}

/// An outgoing network request captured at the fetch boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    /// Requested URL, as issued by the page.
    pub url: String,
    /// Resource kind the requester expects.
    pub destination: RequestDestination,
}

impl AssetRequest {
    /// Creates a request for the given URL and destination.
    #[must_use]
    pub fn new(url: impl Into<String>, destination: RequestDestination) -> Self {
        Self {
            url: url.into(),
            destination,
        }
    }

    /// Creates a full-page navigation request.
    #[must_use]
    pub fn navigation(url: impl Into<String>) -> Self {
        Self::new(url, RequestDestination::Document)
    }

    /// Returns the normalized URL used to match this request against cache
    /// entries.
    #[must_use]
    pub fn match_key(&self) -> String {
        normalize_url(&self.url)
    }
}

/// Normalizes a URL into the form used as a cache match key.
///
/// Fragments are stripped (two URLs differing only in fragment are the same
/// asset), query strings are preserved (they select distinct assets), and
/// site-relative paths are anchored at `/`. Matching ignores headers
/// entirely; the key is the URL and nothing else.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let url = url.split('#').next().unwrap_or(url);

    if url.is_empty() {
        return "/".to_string();
    }
    if url.starts_with("http://") || url.starts_with("https://") || url.starts_with('/') {
        return url.to_string();
    }
    format!("/{url}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_fragment() {
        assert_eq!(normalize_url("/about.html#team"), "/about.html");
        assert_eq!(
            normalize_url("https://cdn.example.com/lib.css#x"),
            "https://cdn.example.com/lib.css"
        );
    }

    #[test]
    fn normalize_keeps_query() {
        assert_eq!(normalize_url("/search?q=rust"), "/search?q=rust");
        assert_eq!(normalize_url("/search?q=rust#top"), "/search?q=rust");
    }

    #[test]
    fn normalize_anchors_relative_paths() {
        assert_eq!(normalize_url("about.html"), "/about.html");
        assert_eq!(normalize_url("assets/css/custom.css"), "/assets/css/custom.css");
    }

    #[test]
    fn normalize_empty_is_root() {
        assert_eq!(normalize_url(""), "/");
        assert_eq!(normalize_url("  "), "/");
        assert_eq!(normalize_url("#hero"), "/");
    }

    #[test]
    fn normalize_absolute_unchanged() {
        let url = "https://cdn.jsdelivr.net/npm/bootstrap@5.3.2/dist/css/bootstrap.min.css";
        assert_eq!(normalize_url(url), url);
    }

    #[test]
    fn match_key_uses_normalized_url() {
        let req = AssetRequest::navigation("/pricing#plans");
        assert_eq!(req.match_key(), "/pricing");
    }

    #[test]
    fn navigation_destination() {
        let req = AssetRequest::navigation("/");
        assert!(req.destination.is_navigation());

        let req = AssetRequest::new("/logo.png", RequestDestination::Image);
        assert!(!req.destination.is_navigation());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn normalize_never_panics(url in ".*") {
                let _ = normalize_url(&url);
            }

            #[test]
            fn normalize_is_idempotent(url in "[a-z/#?=.]{0,40}") {
                let once = normalize_url(&url);
                prop_assert_eq!(normalize_url(&once), once);
            }

            #[test]
            fn normalized_has_no_fragment(url in ".*") {
                prop_assert!(!normalize_url(&url).contains('#'));
            }
        }
    }
}
