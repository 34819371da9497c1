//! API description model for apimeta.
//!
//! This crate turns an OpenAPI 3 or Swagger 2 JSON description into a
//! [`Document`]: a base URL plus the declared operations keyed by their
//! `operationId`. An [`OperationProxy`] binds one operation of a shared
//! document and builds outbound [`PreparedRequest`]s from parameter values.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use apimeta_document::{Document, OperationProxy};
//!
//! let spec = serde_json::json!({
//!     "servers": [{ "url": "https://api.example.com/" }],
//!     "paths": {
//!         "/characters/{character_id}/": {
//!             "get": {
//!                 "operationId": "get_characters_character_id",
//!                 "parameters": [
//!                     { "name": "character_id", "in": "path", "required": true }
//!                 ]
//!             }
//!         }
//!     }
//! });
//!
//! let doc = Arc::new(Document::from_json(spec, "https://fallback.example.com").unwrap());
//! let proxy = OperationProxy::new(doc, "get_characters_character_id").unwrap();
//! let req = proxy.request([("character_id", "42")]).unwrap();
//! assert_eq!(req.url.as_str(), "https://api.example.com/characters/42/");
//! ```

mod document;
mod error;
mod operation;
mod proxy;

pub use document::Document;
pub use error::{DocumentError, RequestError};
pub use operation::{Method, Operation, Parameter, ParameterLocation};
pub use proxy::{OperationProxy, PreparedRequest};
