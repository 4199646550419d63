//! URL resolution and normalization for request identity.

use url::Url;

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a possibly relative URL against `base` and normalize it.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Resolve relative paths (`/app.js`) against the base
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
///
/// Any scheme is accepted so that extension URLs can still be classified.
pub fn resolve(base: &Url, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let parsed = base.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    normalize(parsed)
}

/// Lowercase the host and drop the fragment of an absolute URL.
pub fn normalize(mut url: Url) -> Result<Url, UrlError> {
    if let Some(host) = url.host_str() {
        let lowered = host.to_lowercase();
        if lowered != host {
            url.set_host(Some(&lowered))
                .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
        }
    }

    url.set_fragment(None);

    Ok(url)
}

/// Like [`resolve`], restricted to http(s) targets the network can fetch.
pub fn resolve_http(base: &Url, input: &str) -> Result<Url, UrlError> {
    let url = resolve(base, input)?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }
}
