//! Conditional probe and retried download of description documents.

use std::sync::Arc;

use apimeta_cache::ResponseHeaders;
use apimeta_document::{Document, DocumentError};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{FETCH_FAILURE_STATUS, FetchError, TransportError};
use crate::transport::Transport;

/// Attempts made for a full description download.
pub const MAX_ATTEMPTS: u32 = 3;

const ACCEPT_JSON: (&str, &str) = ("Accept", "application/json");

/// A previously cached document offered for revalidation.
#[derive(Debug, Clone, Copy)]
pub struct Cached<'a> {
    pub document: &'a Arc<Document>,
    pub etag: Option<&'a str>,
}

/// Outcome of a fetch.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub document: Arc<Document>,
    pub headers: ResponseHeaders,
    /// The server answered 304 and `document` is the cached one.
    pub from_cache: bool,
}

/// Why one download attempt failed.
#[derive(Debug, thiserror::Error)]
enum AttemptError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("malformed description: {0}")]
    Document(#[from] DocumentError),
}

/// Performs the network side of a resolution. Persists nothing.
pub struct DocumentFetcher {
    transport: Arc<dyn Transport>,
    fallback_base_url: String,
}

impl DocumentFetcher {
    pub fn new(transport: Arc<dyn Transport>, fallback_base_url: impl Into<String>) -> Self {
        Self {
            transport,
            fallback_base_url: fallback_base_url.into(),
        }
    }

    /// Get a current document for `url`.
    ///
    /// With a cached document, a HEAD is sent first (with `If-None-Match` when
    /// an etag is known); a 304 returns the cached `Arc` untouched. Otherwise
    /// the body is downloaded, retrying immediately up to [`MAX_ATTEMPTS`].
    pub fn fetch(&self, url: &Url, cached: Option<Cached<'_>>) -> Result<Fetched, FetchError> {
        if let Some(cached) = cached {
            let mut headers = vec![ACCEPT_JSON];
            if let Some(etag) = cached.etag {
                headers.push(("If-None-Match", etag));
            }

            match self.transport.head(url, &headers) {
                Ok(response) if response.is_not_modified() => {
                    debug!(%url, "description not modified");
                    return Ok(Fetched {
                        document: Arc::clone(cached.document),
                        headers: response.headers,
                        from_cache: true,
                    });
                }
                Ok(response) => debug!(%url, status = response.status, "description changed"),
                Err(error) => debug!(%url, %error, "HEAD probe failed, downloading"),
            }
        }

        let mut last_error = None;
        for attempt in 1..=MAX_ATTEMPTS {
            match self.download(url) {
                Ok((document, headers)) => {
                    info!(%url, attempt, operations = document.len(), "fetched description");
                    return Ok(Fetched {
                        document: Arc::new(document),
                        headers,
                        from_cache: false,
                    });
                }
                Err(error) => {
                    warn!(attempt, %url, %error, "failed to fetch description");
                    last_error = Some(error);
                }
            }
        }

        Err(FetchError {
            url: url.to_string(),
            status: FETCH_FAILURE_STATUS,
            reason: last_error.map(|e| e.to_string()).unwrap_or_default(),
        })
    }

    fn download(&self, url: &Url) -> Result<(Document, ResponseHeaders), AttemptError> {
        let response = self.transport.get(url, &[ACCEPT_JSON])?;
        if !response.is_success() {
            return Err(AttemptError::Status(response.status));
        }
        let document = Document::from_slice(&response.body, &self.fallback_base_url)?;
        Ok((document, response.headers))
    }
}
