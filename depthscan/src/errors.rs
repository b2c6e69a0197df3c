use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed point record on line {line}: {message}")]
    Format { line: usize, message: String },

    #[error("invalid geometry: {0}")]
    Geometry(String),
}

impl ScanError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        ScanError::InvalidConfig(message.into())
    }
}
