use ndarray::Array2;

use super::schema::ColumnSchema;
use crate::core::PredictionRequest;

/// Encode a request as a single-row feature matrix aligned to `schema`.
///
/// An unknown location leaves every location column at zero, which the model
/// reads as the reference category.
pub fn encode(schema: &ColumnSchema, request: &PredictionRequest) -> Array2<f64> {
    let mut features = Array2::<f64>::zeros((1, schema.len()));

    features[[0, schema.area_index()]] = request.area;
    features[[0, schema.bhk_index()]] = request.bhk as f64;

    if let Some(index) = schema.location_index(&request.location) {
        features[[0, index]] = 1.0;
    }

    features
}
