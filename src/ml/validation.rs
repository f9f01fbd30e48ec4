use crate::core::{PredictionRequest, PriceError, PriceResult};

/// Smallest accepted average room size, in square feet per bedroom.
pub const MIN_AREA_PER_BHK: f64 = 250.0;

/// Reject requests the model should never be asked about.
pub fn validate(request: &PredictionRequest) -> PriceResult<()> {
    if request.bhk <= 0 {
        return Err(PriceError::InvalidInput(
            "bhk must be a positive integer".to_string(),
        ));
    }

    if request.area / (request.bhk as f64) < MIN_AREA_PER_BHK {
        return Err(PriceError::InvalidInput(
            "area too small for given BHK".to_string(),
        ));
    }

    Ok(())
}
