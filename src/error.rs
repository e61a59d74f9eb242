//! Error type shared by the data, model and training modules.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SannError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A table cell or CLI value that could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Dimensions that do not line up (model vs. data, X vs. Y, weights vs. spec).
    #[error("shape mismatch: {0}")]
    Shape(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// A model file that is not in a format this version understands.
    #[error("unsupported model file: {0}")]
    Format(String),
}

impl SannError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SannError>;
