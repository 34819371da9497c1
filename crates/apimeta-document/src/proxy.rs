//! Callable operation proxies.

use std::sync::Arc;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use url::Url;

use crate::document::Document;
use crate::error::RequestError;
use crate::operation::{Method, Operation, ParameterLocation};

/// Characters escaped when substituting a value into a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// One operation of a shared document.
#[derive(Debug, Clone)]
pub struct OperationProxy {
    document: Arc<Document>,
    operation: Operation,
}

/// An outbound request built from an operation and parameter values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: Method,
    /// Full URL including the query string
    pub url: Url,
    /// Query parameters, in the order given, as also encoded into `url`
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl OperationProxy {
    pub fn new(document: Arc<Document>, operation_id: &str) -> Result<Self, RequestError> {
        let operation = document
            .operation(operation_id)
            .cloned()
            .ok_or_else(|| RequestError::UnknownOperation(operation_id.to_string()))?;
        Ok(Self {
            document,
            operation,
        })
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn id(&self) -> &str {
        &self.operation.id
    }

    /// The path template of the operation.
    pub fn path(&self) -> &str {
        &self.operation.path
    }

    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    /// Build the outbound request.
    ///
    /// Names matching a `{placeholder}` of the path template are substituted
    /// into it, header parameters become headers, and everything else
    /// (including names the operation does not declare) goes to the query string.
    pub fn request<I, K, V>(&self, params: I) -> Result<PreparedRequest, RequestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let op = &self.operation;
        let mut path = op.path.clone();
        let mut query = Vec::new();
        let mut headers = Vec::new();

        for (name, value) in params {
            let (name, value) = (name.into(), value.into());
            // Placeholders are filled whether or not the description declares them
            if op.path_placeholders().any(|placeholder| placeholder == name) {
                let encoded = utf8_percent_encode(&value, PATH_SEGMENT).to_string();
                path = path.replace(&format!("{{{name}}}"), &encoded);
                continue;
            }
            match op.parameter(&name).map(|p| p.location) {
                Some(ParameterLocation::Header) => headers.push((name, value)),
                _ => query.push((name, value)),
            }
        }

        if let Some(missing) = op.path_placeholders().find(|name| path.contains(&format!("{{{name}}}"))) {
            return Err(RequestError::MissingParameter {
                operation: op.id.clone(),
                parameter: missing.to_string(),
            });
        }

        let raw = format!("{}{}", self.document.base_url(), path);
        let mut url = Url::parse(&raw).map_err(|e| RequestError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(&query);
        }

        Ok(PreparedRequest {
            method: op.method,
            url,
            query,
            headers,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn document() -> Arc<Document> {
        Arc::new(
            Document::from_json(
                json!({
                    "servers": [{ "url": "https://esi.evetech.net/latest" }],
                    "paths": {
                        "/characters/{character_id}/mail/{mail_id}/": {
                            "put": {
                                "operationId": "put_characters_character_id_mail_mail_id",
                                "parameters": [
                                    { "name": "character_id", "in": "path", "required": true },
                                    { "name": "mail_id", "in": "path", "required": true },
                                    { "name": "token", "in": "query" },
                                    { "name": "If-None-Match", "in": "header" }
                                ]
                            }
                        }
                    }
                }),
                "https://fallback",
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_unknown_operation() {
        let err = OperationProxy::new(document(), "nope").unwrap_err();
        assert_eq!(err, RequestError::UnknownOperation("nope".to_string()));
        assert_eq!(err.to_string(), "nope is not a valid operation");
    }

    #[test]
    fn test_request_splits_parameters() {
        let proxy = OperationProxy::new(document(), "put_characters_character_id_mail_mail_id").unwrap();
        let req = proxy
            .request([
                ("character_id", "90000001"),
                ("mail_id", "7"),
                ("token", "abc"),
                ("If-None-Match", "\"x\""),
                ("page", "2"),
            ])
            .unwrap();

        assert_eq!(req.method, Method::Put);
        assert_eq!(
            req.url.as_str(),
            "https://esi.evetech.net/latest/characters/90000001/mail/7/?token=abc&page=2"
        );
        assert_eq!(req.query.len(), 2);
        assert_eq!(req.query[1], ("page".to_string(), "2".to_string()));
        assert_eq!(req.headers, vec![("If-None-Match".to_string(), "\"x\"".to_string())]);
    }

    #[test]
    fn test_request_encodes_path_values() {
        let proxy = OperationProxy::new(document(), "put_characters_character_id_mail_mail_id").unwrap();
        let req = proxy.request([("character_id", "a/b c"), ("mail_id", "1")]).unwrap();
        assert_eq!(req.url.path(), "/latest/characters/a%2Fb%20c/mail/1/");
    }

    #[test]
    fn test_request_fills_undeclared_placeholder() {
        let doc = Document::from_json(
            json!({
                "servers": [{ "url": "https://esi.evetech.net/latest" }],
                "paths": { "/characters/{character_id}/": { "get": { "operationId": "get_character" } } }
            }),
            "https://fallback",
        )
        .unwrap();
        let proxy = OperationProxy::new(Arc::new(doc), "get_character").unwrap();
        let req = proxy.request([("character_id", "42"), ("page", "1")]).unwrap();
        assert_eq!(req.url.as_str(), "https://esi.evetech.net/latest/characters/42/?page=1");
        assert_eq!(req.query, vec![("page".to_string(), "1".to_string())]);
    }

    #[test]
    fn test_request_missing_path_parameter() {
        let proxy = OperationProxy::new(document(), "put_characters_character_id_mail_mail_id").unwrap();
        let err = proxy.request([("character_id", "1")]).unwrap_err();
        assert_eq!(
            err,
            RequestError::MissingParameter {
                operation: "put_characters_character_id_mail_mail_id".to_string(),
                parameter: "mail_id".to_string(),
            }
        );
    }
}
