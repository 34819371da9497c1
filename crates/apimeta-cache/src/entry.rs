//! The value stored under a cache key.

use std::sync::Arc;

use apimeta_document::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::headers::ResponseHeaders;

/// A cached description document with the response headers it came with.
///
/// `document` and `headers` are written together; an entry with a document
/// but no headers is malformed (see [`CacheEntry::is_well_formed`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(default)]
    pub document: Option<Arc<Document>>,
    #[serde(default)]
    pub headers: Option<ResponseHeaders>,
    /// Deadline set by a fixed cache time. `None` means no explicit expiry was
    /// recorded and freshness comes from the headers.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// Entry for a key nothing is known about.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(
        document: Arc<Document>,
        headers: ResponseHeaders,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            document: Some(document),
            headers: Some(headers),
            expires_at,
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.document.is_none() || self.headers.is_some()
    }

    /// The entity tag recorded with the document, if any.
    pub fn etag(&self) -> Option<&str> {
        self.headers.as_ref().and_then(ResponseHeaders::etag)
    }
}
