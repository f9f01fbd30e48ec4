use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{PriceError, PriceResult};

/// A single prediction request, already coerced to typed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub area: f64,
    pub bhk: i64,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl From<&PriceError> for ErrorResponse {
    fn from(err: &PriceError) -> Self {
        Self::new(err.to_string())
    }
}

impl PredictionRequest {
    pub fn new(area: f64, bhk: i64, location: impl Into<String>) -> Self {
        Self {
            area,
            bhk,
            location: location.into(),
        }
    }

    /// Build a request from a raw JSON body.
    ///
    /// Browser forms post `area` and `bhk` as strings, so numeric strings are
    /// accepted alongside JSON numbers. A fractional `bhk` is truncated toward
    /// zero.
    pub fn from_json(body: &Value) -> PriceResult<Self> {
        let fields = body.as_object().ok_or_else(|| {
            PriceError::MalformedRequest("request body must be a JSON object".to_string())
        })?;

        let area = parse_area(field(fields, "area")?)?;
        let bhk = parse_bhk(field(fields, "bhk")?)?;
        let location = match field(fields, "location")? {
            Value::String(location) => location.clone(),
            _ => return Err(malformed("location", "must be a string")),
        };

        Ok(Self {
            area,
            bhk,
            location,
        })
    }
}

fn field<'a>(fields: &'a serde_json::Map<String, Value>, name: &str) -> PriceResult<&'a Value> {
    fields
        .get(name)
        .ok_or_else(|| PriceError::MalformedRequest(format!("missing field `{}`", name)))
}

fn malformed(name: &str, reason: &str) -> PriceError {
    PriceError::MalformedRequest(format!("field `{}` {}", name, reason))
}

fn parse_area(value: &Value) -> PriceResult<f64> {
    let area = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| malformed("area", "must be a number"))?;

    if !area.is_finite() {
        return Err(malformed("area", "must be a finite number"));
    }
    Ok(area)
}

fn parse_bhk(value: &Value) -> PriceResult<i64> {
    match value {
        Value::Number(n) => {
            if let Some(bhk) = n.as_i64() {
                return Ok(bhk);
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.trunc().abs() < i64::MAX as f64 => Ok(f.trunc() as i64),
                _ => Err(malformed("bhk", "must be an integer")),
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| malformed("bhk", "must be an integer")),
        _ => Err(malformed("bhk", "must be an integer")),
    }
}
