//! Error types for the registry.

use std::path::PathBuf;

pub use apimeta_document::RequestError;

/// Status reported when every fetch attempt failed.
pub const FETCH_FAILURE_STATUS: u16 = 500;

/// Top-level error of registry operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A description document could not be fetched after all retries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot fetch '{url}' ({status}): {reason}")]
pub struct FetchError {
    pub url: String,
    pub status: u16,
    /// Error of the last attempt
    pub reason: String,
}

/// A name could not be resolved against a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("{0} is not a valid operation")]
    UnknownOperation(String),

    #[error("{0} is not a swagger endpoint")]
    NotADocumentReference(String),

    #[error("{0} references a swagger endpoint, not an operation")]
    DocumentReference(String),

    #[error("cannot build a URL for the document referenced by {name}: {reason}")]
    InvalidReference { name: String, reason: String },
}

/// Failure of a single HEAD or GET exchange.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// HTTP client error
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection-level failure reported by a custom transport
    #[error("connection error: {0}")]
    Connection(String),
}

/// Configuration could not be read.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid URL in `{field}`: {source}")]
    InvalidUrl {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("no transport configured (enable the `http` feature or pass one)")]
    MissingTransport,

    #[cfg(feature = "http")]
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}
