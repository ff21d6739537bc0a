//! Error types for refgen

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// refgen errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Code parse error: {0}")]
    CodeParse(String),

    #[error("Malformed reference marker: {0}")]
    Reference(String),

    #[error("Traversal of {context} failed")]
    Traverse {
        context: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Cycle detected in type graph: {0}")]
    Cycle(String),

    #[error("{role} processor at index {index} failed")]
    Processor {
        role: &'static str,
        index: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("Render error: {0}")]
    Render(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_norway::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Wrap this error with breadcrumb context, e.g. the field or type
    /// being processed, preserving the underlying error as the source.
    pub fn traversing(self, context: impl Into<String>) -> Error {
        Error::Traverse {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
