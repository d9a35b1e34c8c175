#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Malformed request payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Request payload is not valid UTF-8")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("Unexpected request shape: {0}")]
    Schema(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}

