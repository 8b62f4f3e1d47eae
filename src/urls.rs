//! URL building and parsing helpers
//!
//! Collection endpoints are addressed by paths relative to the API base URL;
//! sideload members reference their primary record by URL, so embedding needs
//! to recover numeric ids from trailing and middle path segments.

use crate::error::{Error, Result};
use url::Url;

/// Parse and validate the API base URL.
pub fn validate_base_url(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url)?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(Error::config(format!(
            "base URL must be an http(s) URL, got: {base_url}"
        )));
    }
    Ok(url)
}

/// Join a path with the base URL unless it is already absolute.
pub fn enforce_domain(url: &str, base_url: &str) -> String {
    if url.starts_with("https://") || url.starts_with("http://") {
        return url.to_string();
    }
    let base = base_url.trim_end_matches('/');
    let path = url.trim_start_matches('/');
    format!("{base}/{path}")
}

/// URL of a single object within a resource collection.
pub fn build_resource_url(resource: &str, id: u64) -> String {
    format!("{resource}/{id}")
}

/// URL of the export endpoint of a single object.
pub fn build_export_url(resource: &str, id: u64) -> String {
    format!("{}/export", build_resource_url(resource, id))
}

/// Full URL of the login endpoint.
pub fn build_login_url(base_url: &str) -> String {
    format!("{}/auth/login", base_url.trim_end_matches('/'))
}

/// Parse the id of the referenced object from a resource URL.
///
/// The nested `content` relation URL ends with a `/content` suffix that must
/// be stripped before the trailing segment is the id.
pub fn parse_resource_id(url: &str) -> Result<u64> {
    let trimmed = url.trim_end_matches("/content");
    trimmed
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
        .ok_or_else(|| Error::envelope(format!("cannot parse resource id from URL: {url}")))
}

/// Parse the id of the owning record from a nested group member URL.
///
/// URL format: `.../<resource>/<owner id>/content/<member id>`. The member's
/// own trailing sub-path is discarded.
pub fn parse_owner_id(url: &str) -> Result<u64> {
    let owner_part = match url.split_once("/content/") {
        Some((prefix, _)) => prefix,
        None => url,
    };
    parse_resource_id(owner_part)
}
