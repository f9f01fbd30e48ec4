// Pricing model: column schema, feature encoding, inference and price transform

pub mod encoder;
pub mod predictor;
pub mod schema;
pub mod service;
pub mod transform;
pub mod validation;

pub use encoder::encode;
pub use predictor::{load_model, Aggregation, LinearModel, ModelArtifact, Predictor, TreeEnsemble};
pub use schema::ColumnSchema;
pub use service::PricingService;
pub use validation::{validate, MIN_AREA_PER_BHK};
