//! Utility functions and helpers.

pub mod http;

/// Join a link from an API response onto a base URL.
///
/// Absolute links are returned unchanged.
pub fn join_link(base: &str, link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        return link.to_string();
    }

    let base = base.trim_end_matches('/');
    if link.starts_with('/') {
        format!("{base}{link}")
    } else {
        format!("{base}/{link}")
    }
}

/// Strip a leading `https://` scheme, leaving host and path.
pub fn strip_https(url: &str) -> &str {
    url.strip_prefix("https://").unwrap_or(url)
}
