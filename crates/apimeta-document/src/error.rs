//! Document error types.

/// Errors raised while reading an API description.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The payload was not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The top level of the description is not a JSON object
    #[error("API description must be a JSON object")]
    NotAnObject,

    /// `paths` exists but is not an object
    #[error("`paths` must be an object")]
    InvalidPaths,
}

/// Errors raised while building a request from an operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("{0} is not a valid operation")]
    UnknownOperation(String),

    #[error("missing required path parameter `{parameter}` for `{operation}`")]
    MissingParameter {
        operation: String,
        parameter: String,
    },

    #[error("invalid request URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
}
