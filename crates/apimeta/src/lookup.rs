//! Result of looking a name up in the root document.

use std::sync::Arc;

use apimeta_document::{Document, OperationProxy};
use url::Url;

use crate::error::{Error, LookupError};

/// A nested description, resolved under its own cache key.
#[derive(Debug, Clone)]
pub struct NestedDocument {
    /// Operation of the root document that references this description
    pub name: String,
    pub key: String,
    pub url: Url,
    pub document: Arc<Document>,
}

impl NestedDocument {
    pub fn operation(&self, id: &str) -> Result<OperationProxy, Error> {
        OperationProxy::new(Arc::clone(&self.document), id)
            .map_err(|_| LookupError::UnknownOperation(id.to_string()).into())
    }
}

/// What a name in the root document stands for.
#[derive(Debug, Clone)]
pub enum Resolved {
    Operation(OperationProxy),
    Document(NestedDocument),
}

impl Resolved {
    pub fn into_operation(self) -> Result<OperationProxy, LookupError> {
        match self {
            Resolved::Operation(proxy) => Ok(proxy),
            Resolved::Document(nested) => Err(LookupError::DocumentReference(nested.name)),
        }
    }

    pub fn into_document(self) -> Result<NestedDocument, LookupError> {
        match self {
            Resolved::Document(nested) => Ok(nested),
            Resolved::Operation(proxy) => Err(LookupError::NotADocumentReference(proxy.id().to_string())),
        }
    }
}
