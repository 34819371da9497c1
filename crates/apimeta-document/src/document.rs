//! Parsed API description.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DocumentError;
use crate::operation::{Method, Operation, Parameter, ParameterLocation};

/// A parsed API description.
///
/// Immutable once built. Registries share it behind an `Arc` and replace the
/// whole `Arc` on refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DocumentRepr", into = "DocumentRepr")]
pub struct Document {
    base_url: String,
    operations: IndexMap<String, Operation>,
    raw: Value,
}

/// Serialized form: the raw description plus the resolved base URL, so a
/// stored document rebuilds to the same operations.
#[derive(Serialize, Deserialize)]
struct DocumentRepr {
    base_url: String,
    spec: Value,
}

impl TryFrom<DocumentRepr> for Document {
    type Error = DocumentError;

    fn try_from(repr: DocumentRepr) -> Result<Self, Self::Error> {
        Document::from_json(repr.spec, &repr.base_url)
    }
}

impl From<Document> for DocumentRepr {
    fn from(doc: Document) -> Self {
        DocumentRepr {
            base_url: doc.base_url,
            spec: doc.raw,
        }
    }
}

impl Document {
    /// Parse a description from raw bytes.
    pub fn from_slice(bytes: &[u8], fallback_base_url: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_json(value, fallback_base_url)
    }

    /// Build a document from a JSON description.
    ///
    /// `fallback_base_url` is used when the description declares neither
    /// `servers` (OpenAPI 3) nor `host` (Swagger 2).
    pub fn from_json(raw: Value, fallback_base_url: &str) -> Result<Self, DocumentError> {
        let root = raw.as_object().ok_or(DocumentError::NotAnObject)?;
        let base_url = base_url(root)
            .unwrap_or_else(|| fallback_base_url.to_string())
            .trim_end_matches('/')
            .to_string();

        let mut operations = IndexMap::new();
        let paths = match root.get("paths") {
            None | Some(Value::Null) => None,
            Some(Value::Object(paths)) => Some(paths),
            Some(_) => return Err(DocumentError::InvalidPaths),
        };

        for (path, item) in paths.into_iter().flatten() {
            let Some(item) = item.as_object() else {
                continue;
            };
            let shared = parameters(root, item.get("parameters"));

            for (key, op) in item {
                let Ok(method) = key.parse::<Method>() else {
                    continue;
                };
                let Some(id) = op.get("operationId").and_then(Value::as_str) else {
                    continue;
                };

                // Operation-level parameters override path-level ones of the same name
                let mut params = parameters(root, op.get("parameters"));
                for p in &shared {
                    if !params.iter().any(|q| q.name == p.name && q.location == p.location) {
                        params.push(p.clone());
                    }
                }

                operations.insert(
                    id.to_string(),
                    Operation {
                        id: id.to_string(),
                        method,
                        path: path.clone(),
                        parameters: params,
                        summary: op.get("summary").and_then(Value::as_str).map(String::from),
                    },
                );
            }
        }

        Ok(Self {
            base_url,
            operations,
            raw,
        })
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn operation(&self, id: &str) -> Option<&Operation> {
        self.operations.get(id)
    }

    /// Operations in declaration order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    pub fn operation_ids(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// The description as it was received.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// `info.title`, if declared.
    pub fn title(&self) -> Option<&str> {
        self.raw.pointer("/info/title").and_then(Value::as_str)
    }

    /// `info.version`, if declared.
    pub fn version(&self) -> Option<&str> {
        self.raw.pointer("/info/version").and_then(Value::as_str)
    }
}

fn base_url(root: &Map<String, Value>) -> Option<String> {
    if let Some(url) = root
        .get("servers")
        .and_then(Value::as_array)
        .and_then(|servers| servers.first())
        .and_then(|server| server.get("url"))
        .and_then(Value::as_str)
    {
        return Some(url.to_string());
    }

    // Swagger 2: schemes[0]://host/basePath
    let host = root.get("host").and_then(Value::as_str)?;
    let scheme = root
        .get("schemes")
        .and_then(Value::as_array)
        .and_then(|schemes| schemes.first())
        .and_then(Value::as_str)
        .unwrap_or("https");
    let base_path = root.get("basePath").and_then(Value::as_str).unwrap_or("");
    Some(format!("{scheme}://{host}{base_path}"))
}

fn parameters(root: &Map<String, Value>, list: Option<&Value>) -> Vec<Parameter> {
    let Some(list) = list.and_then(Value::as_array) else {
        return Vec::new();
    };

    list.iter()
        .filter_map(|p| resolve_ref(root, p))
        .filter_map(|p| {
            let name = p.get("name")?.as_str()?;
            let location = ParameterLocation::parse(p.get("in")?.as_str()?)?;
            let required = location == ParameterLocation::Path
                || p.get("required").and_then(Value::as_bool).unwrap_or(false);
            Some(Parameter {
                name: name.to_string(),
                location,
                required,
                description: p.get("description").and_then(Value::as_str).map(String::from),
            })
        })
        .collect()
}

/// Follow a local `$ref` (`#/parameters/...` or `#/components/parameters/...`).
fn resolve_ref<'a>(root: &'a Map<String, Value>, value: &'a Value) -> Option<&'a Value> {
    match value.get("$ref").and_then(Value::as_str) {
        None => Some(value),
        Some(reference) => {
            let pointer = reference.strip_prefix('#')?;
            let mut segments = pointer.split('/').skip(1);
            let first = segments.next()?;
            let mut current = root.get(first)?;
            for segment in segments {
                let segment = segment.replace("~1", "/").replace("~0", "~");
                current = current.get(segment.as_str())?;
            }
            Some(current)
        }
    }
}
