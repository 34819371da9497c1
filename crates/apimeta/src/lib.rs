//! Cache-aware access to remote API descriptions.
//!
//! A [`Registry`] fetches a root ("meta") OpenAPI / Swagger description,
//! exposes its operations as [`OperationProxy`] values, and resolves the
//! descriptions the root references as nested documents. Every document is
//! cached under its own key and refreshed according to the configured
//! [`FreshnessPolicy`]: a fixed cache time, the server's `Expires` header, or
//! no caching at all. Stale documents that carry an `ETag` are revalidated
//! with a conditional HEAD before being downloaded again.
//!
//! # Features
//!
//! - `http` (default) - [`HttpTransport`] over `reqwest::blocking`
//! - `native` - filesystem cache backend (`FsCache`)
//!
//! # Example
//!
//! ```no_run
//! use apimeta::{Registry, RegistryConfig, Resolved};
//!
//! let registry = Registry::new(RegistryConfig::default()).unwrap();
//! match registry.lookup("latest").unwrap() {
//!     Resolved::Document(nested) => {
//!         let op = nested.operation("get_status").unwrap();
//!         let request = op.request::<_, String, String>([]).unwrap();
//!         println!("{} {}", request.method, request.url);
//!     }
//!     Resolved::Operation(op) => println!("{}", op.path()),
//! }
//! ```

mod config;
mod error;
mod fetch;
#[cfg(feature = "http")]
mod http;
mod lookup;
mod registry;
mod transport;

pub use config::{CONFIG_FILENAME, DEFAULT_BASE_URL, DEFAULT_META_URL, RegistryConfig};
pub use error::{
    ConfigError, Error, FETCH_FAILURE_STATUS, FetchError, LookupError, RequestError,
    TransportError,
};
pub use fetch::{Cached, DocumentFetcher, Fetched, MAX_ATTEMPTS};
#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use lookup::{NestedDocument, Resolved};
pub use registry::{Registry, RegistryBuilder, nested_key, root_key};
pub use transport::{NOT_MODIFIED, Response, Transport};

pub use apimeta_cache as cache;
pub use apimeta_cache::FreshnessPolicy;
pub use apimeta_document as document;
pub use apimeta_document::{Document, OperationProxy, PreparedRequest};
