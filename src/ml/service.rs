use std::sync::Arc;
use tracing::{debug, info};

use super::encoder::encode;
use super::predictor::{load_model, Predictor};
use super::schema::ColumnSchema;
use super::transform::to_price;
use super::validation::validate;
use crate::core::{ModelConfig, PredictionRequest, PredictionResponse, PriceError, PriceResult};
use crate::track_performance;

/// Shared, read-only pricing state handed to every request handler.
#[derive(Clone)]
pub struct PricingService {
    schema: Arc<ColumnSchema>,
    predictor: Arc<dyn Predictor>,
}

impl PricingService {
    pub fn new(schema: ColumnSchema, predictor: Arc<dyn Predictor>) -> PriceResult<Self> {
        if predictor.n_features() != schema.len() {
            return Err(PriceError::ModelError(format!(
                "model expects {} features but the column schema has {}",
                predictor.n_features(),
                schema.len()
            )));
        }

        Ok(Self {
            schema: Arc::new(schema),
            predictor,
        })
    }

    /// Load the column schema and model artifact named in `config`.
    pub fn load(config: &ModelConfig) -> PriceResult<Self> {
        let schema = ColumnSchema::load(&config.columns_path)?;
        let predictor: Arc<dyn Predictor> = Arc::from(load_model(&config.model_path)?);
        let service = Self::new(schema, predictor)?;
        info!(features = service.schema.len(), "Pricing service ready");
        Ok(service)
    }

    pub fn predict(&self, request: &PredictionRequest) -> PriceResult<PredictionResponse> {
        track_performance!("predict");

        if let Err(err) = validate(request) {
            debug!(area = request.area, bhk = request.bhk, %err, "Rejected prediction request");
            return Err(err);
        }

        let features = encode(&self.schema, request);
        let scores = self.predictor.predict(features.view())?;
        let raw = scores
            .first()
            .copied()
            .ok_or_else(|| PriceError::ModelError("model returned no score".to_string()))?;
        let predicted_price = to_price(raw)?;

        debug!(
            area = request.area,
            bhk = request.bhk,
            location = %request.location,
            raw_score = raw,
            predicted_price,
            "Prediction served"
        );
        Ok(PredictionResponse { predicted_price })
    }

    pub fn locations(&self) -> Vec<String> {
        self.schema.locations()
    }
}
