use thiserror::Error;

#[derive(Error, Debug)]
pub enum PriceError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl PriceError {
    /// Errors caused by the caller's request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PriceError::InvalidInput(_) | PriceError::MalformedRequest(_)
        )
    }
}

impl From<config::ConfigError> for PriceError {
    fn from(err: config::ConfigError) -> Self {
        PriceError::ConfigError(err.to_string())
    }
}

pub type PriceResult<T> = Result<T, PriceError>;
