//! Transport seam for fetching description documents.

use apimeta_cache::ResponseHeaders;
use url::Url;

use crate::error::TransportError;

/// HTTP 304 Not Modified.
pub const NOT_MODIFIED: u16 = 304;

/// Response of a HEAD or GET exchange.
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub status: u16,
    pub headers: ResponseHeaders,
    /// Empty for HEAD
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_modified(&self) -> bool {
        self.status == NOT_MODIFIED
    }
}

/// Blocking HTTP client used for description fetches.
///
/// Implementations report non-2xx statuses as `Ok`; only connection-level
/// failures are errors.
pub trait Transport: Send + Sync {
    fn head(&self, url: &Url, headers: &[(&str, &str)]) -> Result<Response, TransportError>;

    fn get(&self, url: &Url, headers: &[(&str, &str)]) -> Result<Response, TransportError>;
}
