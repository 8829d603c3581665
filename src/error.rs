use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
///
/// Missing paths, missing verbs and hidden markers are not errors: the reader
/// skips those methods silently. Everything here aborts the current read pass.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("parse error in {}: {message}", file.display())]
    ParseError { file: PathBuf, message: String },

    #[error("invalid descriptor bundle {}: {message}", file.display())]
    DescriptorError { file: PathBuf, message: String },

    #[error("invalid type `{ty}`: {message}")]
    InvalidTypeSyntax { ty: String, message: String },

    #[error("type `{0}` could not be resolved to a model or scalar")]
    UnresolvedType(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML: {}", err))
    }
}

impl From<syn::Error> for Error {
    fn from(err: syn::Error) -> Self {
        Error::ParseError {
            file: PathBuf::from("<unknown>"),
            message: err.to_string(),
        }
    }
}
