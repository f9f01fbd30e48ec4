//! Flat price prediction service.
//!
//! Loads a column schema and a portable regression model once at start-up,
//! encodes `(area, bhk, location)` requests into feature rows and serves the
//! resulting prices over HTTP.

pub mod api;
pub mod core;
pub mod monitoring;
pub mod ml;

pub use crate::core::{PredictionRequest, PredictionResponse, PriceError, PriceResult, Settings};
pub use crate::ml::PricingService;
