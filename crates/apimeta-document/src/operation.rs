//! Operation metadata extracted from a description.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// HTTP method of a declared operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Head => "HEAD",
            Method::Patch => "PATCH",
            Method::Trace => "TRACE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ();

    /// Path item keys are lowercase in both Swagger 2 and OpenAPI 3, but any
    /// casing is accepted. Non-method keys (`parameters`, `summary`, ...) fail.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Method::Get),
            "put" => Ok(Method::Put),
            "post" => Ok(Method::Post),
            "delete" => Ok(Method::Delete),
            "options" => Ok(Method::Options),
            "head" => Ok(Method::Head),
            "patch" => Ok(Method::Patch),
            "trace" => Ok(Method::Trace),
            _ => Err(()),
        }
    }
}

/// Where a parameter is carried in the outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
    Body,
    FormData,
}

impl ParameterLocation {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "path" => Some(ParameterLocation::Path),
            "query" => Some(ParameterLocation::Query),
            "header" => Some(ParameterLocation::Header),
            "cookie" => Some(ParameterLocation::Cookie),
            "body" => Some(ParameterLocation::Body),
            "formData" => Some(ParameterLocation::FormData),
            _ => None,
        }
    }
}

/// A declared parameter of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    /// Path parameters are always required, whatever the description says.
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A declared operation: method, path template and parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// The `operationId`
    pub id: String,
    pub method: Method,
    /// Path template with `{name}` placeholders, as written in `paths`
    pub path: String,
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl Operation {
    /// Whether the path template names another description document.
    pub fn is_document_reference(&self, marker: &str) -> bool {
        self.path.contains(marker)
    }

    /// Get a declared parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Names of the `{placeholders}` in the path template, in order.
    pub fn path_placeholders(&self) -> impl Iterator<Item = &str> {
        self.path.split('{').skip(1).filter_map(|s| s.split_once('}').map(|(name, _)| name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(path: &str) -> Operation {
        Operation {
            id: "op".to_string(),
            method: Method::Get,
            path: path.to_string(),
            parameters: Vec::new(),
            summary: None,
        }
    }

    #[test]
    fn test_method_from_str_any_case() {
        assert_eq!("get".parse::<Method>(), Ok(Method::Get));
        assert_eq!("DELETE".parse::<Method>(), Ok(Method::Delete));
        assert!("parameters".parse::<Method>().is_err());
    }

    #[test]
    fn test_path_placeholders() {
        let op = op("/characters/{character_id}/assets/{item_id}/");
        let names: Vec<_> = op.path_placeholders().collect();
        assert_eq!(names, vec!["character_id", "item_id"]);

        assert_eq!(self::op("/status/").path_placeholders().count(), 0);
    }

    #[test]
    fn test_is_document_reference() {
        assert!(op("//esi.evetech.net/latest/swagger.json").is_document_reference("swagger.json"));
        assert!(!op("/characters/{character_id}/").is_document_reference("swagger.json"));
    }
}
