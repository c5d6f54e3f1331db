use crate::{UrlError, UrlResult};
use url::{Origin, Url};

/// Reduces a URL to its origin (scheme + host + port)
///
/// The origin is serialized the way a browser serializes it: no trailing
/// slash, and default ports elided. Only HTTP(S) URLs with a non-empty
/// host have a crawlable origin.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use driftnet::url::origin_of;
///
/// let url = Url::parse("https://Example.com:443/path?q=1").unwrap();
/// assert_eq!(origin_of(&url), Some("https://example.com".to_string()));
///
/// let url = Url::parse("http://example.com:8080/").unwrap();
/// assert_eq!(origin_of(&url), Some("http://example.com:8080".to_string()));
///
/// let url = Url::parse("mailto:someone@example.com").unwrap();
/// assert_eq!(origin_of(&url), None);
/// ```
pub fn origin_of(url: &Url) -> Option<String> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return None,
    }

    match url.origin() {
        origin @ Origin::Tuple(..) => Some(origin.ascii_serialization()),
        Origin::Opaque(_) => None,
    }
}

/// Computes the store key for a seed address
///
/// A bare origin (`http://a.example/`) is keyed the same way discovered
/// origins are (`http://a.example`), so the seed and its own outbound
/// references collapse onto one record. Any other address keeps its
/// serialized form.
pub fn seed_key(input: &str) -> UrlResult<String> {
    let url = Url::parse(input.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS seeds are supported, got: {}",
            url.scheme()
        )));
    }

    let origin = origin_of(&url).ok_or(UrlError::MissingHost)?;

    if url.path() == "/" && url.query().is_none() && url.fragment().is_none() {
        Ok(origin)
    } else {
        Ok(url.to_string())
    }
}
