use flat_price_api::api::{PriceApiServer, HEALTH_MESSAGE};
use flat_price_api::core::{ModelConfig, ServerConfig};
use flat_price_api::ml::transform::round_to_cents;
use flat_price_api::{PriceError, PricingService};
use serde_json::{json, Value};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use warp::test::request;

/// End-to-end tests driving the HTTP routes over fixture artifacts
mod integration_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }

    fn model_config(model: &str) -> ModelConfig {
        ModelConfig {
            model_path: fixture(model),
            columns_path: fixture("model_columns.json"),
        }
    }

    fn server(model: &str) -> PriceApiServer {
        let service = PricingService::load(&model_config(model)).unwrap();
        PriceApiServer::new(ServerConfig::default(), service).unwrap()
    }

    fn price(raw: f64) -> f64 {
        round_to_cents(raw.exp_m1())
    }

    fn body_json(body: &[u8]) -> Value {
        serde_json::from_slice(body).unwrap()
    }

    fn assert_price(body: &Value, raw: f64) {
        let predicted = body["predicted_price"].as_f64().unwrap();
        assert!(
            (predicted - price(raw)).abs() < 0.02,
            "predicted {} expected {}",
            predicted,
            price(raw)
        );
    }

    #[tokio::test]
    async fn test_health_check() {
        let routes = server("price_model.json").create_routes();

        let resp = request().method("GET").path("/").reply(&routes).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(resp.body(), HEALTH_MESSAGE);
    }

    #[tokio::test]
    async fn test_predict_known_location() {
        let routes = server("price_model.json").create_routes();

        let resp = request()
            .method("POST")
            .path("/predict")
            .json(&json!({"area": 1000, "bhk": 2, "location": "Bopal"}))
            .reply(&routes)
            .await;

        assert_eq!(resp.status(), 200);
        // 14.2 + 1000 * 0.0006 + 2 * 0.08 + 0.2
        assert_price(&body_json(resp.body()), 15.16);
    }

    #[tokio::test]
    async fn test_predict_accepts_form_strings() {
        let routes = server("price_model.json").create_routes();

        let resp = request()
            .method("POST")
            .path("/predict")
            .json(&json!({"area": "1000", "bhk": "2", "location": "Bopal"}))
            .reply(&routes)
            .await;

        assert_eq!(resp.status(), 200);
        assert_price(&body_json(resp.body()), 15.16);
    }

    #[tokio::test]
    async fn test_unknown_location_uses_baseline() {
        let routes = server("price_model.json").create_routes();

        let resp = request()
            .method("POST")
            .path("/predict")
            .json(&json!({"area": 1000, "bhk": 2, "location": "Navrangpura"}))
            .reply(&routes)
            .await;

        assert_eq!(resp.status(), 200);
        assert_price(&body_json(resp.body()), 14.96);
    }

    #[tokio::test]
    async fn test_area_too_small() {
        let routes = server("price_model.json").create_routes();

        let resp = request()
            .method("POST")
            .path("/predict")
            .json(&json!({"area": 400, "bhk": 2, "location": "Bopal"}))
            .reply(&routes)
            .await;

        assert_eq!(resp.status(), 400);
        assert_eq!(
            body_json(resp.body()),
            json!({"error": "Invalid input: area too small for given BHK"})
        );
    }

    #[tokio::test]
    async fn test_zero_bhk_is_rejected() {
        let routes = server("price_model.json").create_routes();

        let resp = request()
            .method("POST")
            .path("/predict")
            .json(&json!({"area": 1000, "bhk": 0, "location": "Bopal"}))
            .reply(&routes)
            .await;

        assert_eq!(resp.status(), 400);
        assert_eq!(
            body_json(resp.body()),
            json!({"error": "Invalid input: bhk must be a positive integer"})
        );
    }

    #[tokio::test]
    async fn test_malformed_requests() {
        let routes = server("price_model.json").create_routes();

        let missing = request()
            .method("POST")
            .path("/predict")
            .json(&json!({"bhk": 2, "location": "Bopal"}))
            .reply(&routes)
            .await;
        assert_eq!(missing.status(), 400);
        assert_eq!(
            body_json(missing.body()),
            json!({"error": "Malformed request: missing field `area`"})
        );

        let not_numeric = request()
            .method("POST")
            .path("/predict")
            .json(&json!({"area": "large", "bhk": 2, "location": "Bopal"}))
            .reply(&routes)
            .await;
        assert_eq!(not_numeric.status(), 400);

        let not_json = request()
            .method("POST")
            .path("/predict")
            .header("content-type", "application/json")
            .body("area=1000&bhk=2")
            .reply(&routes)
            .await;
        assert_eq!(not_json.status(), 400);
        let error = body_json(not_json.body())["error"].as_str().unwrap().to_string();
        assert!(error.starts_with("Malformed request:"), "{}", error);
    }

    #[tokio::test]
    async fn test_locations() {
        let routes = server("price_model.json").create_routes();

        let resp = request().method("GET").path("/api/locations").reply(&routes).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(
            body_json(resp.body()),
            json!([
                "Ambli",
                "Bodakdev",
                "Bopal",
                "Gota",
                "Satellite",
                "Science City",
                "South Bopal",
                "Thaltej"
            ])
        );
    }

    #[tokio::test]
    async fn test_analytics() {
        let routes = server("price_model.json").create_routes();

        let resp = request().method("GET").path("/api/analytics").reply(&routes).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(
            body_json(resp.body()),
            json!({
                "top_locations": [
                    {"name": "Ambli", "price": 12500000},
                    {"name": "Bodakdev", "price": 11000000},
                    {"name": "Science City", "price": 9500000},
                    {"name": "Thaltej", "price": 9000000},
                    {"name": "Sindhu Bhavan", "price": 15000000},
                    {"name": "Satellite", "price": 8500000},
                    {"name": "Prahlad Nagar", "price": 8800000},
                    {"name": "Bopal", "price": 6000000},
                    {"name": "Gota", "price": 4500000},
                    {"name": "South Bopal", "price": 5500000}
                ],
                "bhk_distribution": [
                    {"bhk": 1, "avg_price": 2500000},
                    {"bhk": 2, "avg_price": 4500000},
                    {"bhk": 3, "avg_price": 8500000},
                    {"bhk": 4, "avg_price": 18000000},
                    {"bhk": 5, "avg_price": 35000000}
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let routes = server("price_model.json").create_routes();

        let resp = request()
            .method("OPTIONS")
            .path("/predict")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .reply(&routes)
            .await;

        assert_eq!(resp.status(), 200);
        assert!(resp.headers().contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn test_tree_ensemble_model() {
        let routes = server("forest_model.json").create_routes();

        let gota = request()
            .method("POST")
            .path("/predict")
            .json(&json!({"area": 1000, "bhk": 2, "location": "Gota"}))
            .reply(&routes)
            .await;
        assert_eq!(gota.status(), 200);
        assert_price(&body_json(gota.body()), (15.0 + 14.9) / 2.0);

        let ambli = request()
            .method("POST")
            .path("/predict")
            .json(&json!({"area": 1500, "bhk": 3, "location": "Ambli"}))
            .reply(&routes)
            .await;
        assert_eq!(ambli.status(), 200);
        assert_price(&body_json(ambli.body()), (15.6 + 16.4) / 2.0);
    }

    #[test]
    fn test_missing_artifacts_are_fatal() {
        let config = ModelConfig {
            model_path: fixture("does_not_exist.json"),
            columns_path: fixture("model_columns.json"),
        };
        assert!(matches!(
            PricingService::load(&config),
            Err(PriceError::ModelError(_))
        ));

        let config = ModelConfig {
            model_path: fixture("price_model.json"),
            columns_path: fixture("does_not_exist.json"),
        };
        assert!(matches!(
            PricingService::load(&config),
            Err(PriceError::SchemaError(_))
        ));
    }

    #[test]
    fn test_schema_without_bhk_is_fatal() {
        let mut columns = NamedTempFile::new().unwrap();
        write!(columns, r#"["area_in_sqft", "location_Bopal"]"#).unwrap();

        let config = ModelConfig {
            model_path: fixture("price_model.json"),
            columns_path: columns.path().to_path_buf(),
        };
        let err = PricingService::load(&config).err().unwrap();
        assert_eq!(err.to_string(), "Schema error: required column `bhk` is missing");
    }

    #[test]
    fn test_model_schema_width_mismatch_is_fatal() {
        let mut columns = NamedTempFile::new().unwrap();
        write!(columns, r#"["area_in_sqft", "bhk", "location_Bopal"]"#).unwrap();

        let config = ModelConfig {
            model_path: fixture("price_model.json"),
            columns_path: columns.path().to_path_buf(),
        };
        assert!(matches!(
            PricingService::load(&config),
            Err(PriceError::ModelError(_))
        ));
    }
}
