use tracing::warn;

use crate::core::{PriceError, PriceResult};

/// Undo the `ln(1 + price)` target transform used at training time.
pub fn inverse_log1p(raw: f64) -> f64 {
    raw.exp_m1()
}

/// Round half away from zero to two decimal places.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Turn a raw model score into a reportable price.
///
/// Negative prices are clamped to zero.
pub fn to_price(raw: f64) -> PriceResult<f64> {
    let price = round_to_cents(inverse_log1p(raw));
    if !price.is_finite() {
        return Err(PriceError::ModelError(format!(
            "model produced a non-finite price from score {}",
            raw
        )));
    }

    if price < 0.0 {
        warn!(raw_score = raw, price, "Model produced a negative price, clamping to zero");
        return Ok(0.0);
    }

    Ok(price)
}
