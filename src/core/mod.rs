pub mod config;
pub mod error;
pub mod types;

pub use self::config::{ModelConfig, ServerConfig, Settings};
pub use self::error::{PriceError, PriceResult};
pub use self::types::{ErrorResponse, PredictionRequest, PredictionResponse};
