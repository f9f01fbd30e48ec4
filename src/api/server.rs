use anyhow::{Context, Result};
use serde_json::Value;
use std::convert::Infallible;
use tracing::{error, info};
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::{Filter, Rejection, Reply};

use super::analytics::AnalyticsReport;
use crate::core::{ErrorResponse, PredictionRequest, PriceError, PriceResult, ServerConfig};
use crate::ml::PricingService;

pub const HEALTH_MESSAGE: &str = "Server is up and running!";

/// HTTP front end for the pricing service
pub struct PriceApiServer {
    config: ServerConfig,
    service: PricingService,
}

impl PriceApiServer {
    /// Fails on CORS origins warp could not parse.
    pub fn new(config: ServerConfig, service: PricingService) -> PriceResult<Self> {
        config.validate_origins()?;
        Ok(Self { config, service })
    }

    /// Bind and serve until Ctrl-C.
    pub async fn start(&self) -> Result<()> {
        let addr = self.config.socket_addr()?;
        let routes = self.create_routes().with(warp::trace::request());

        let (bound, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(addr, shutdown_signal())
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!("Serving price predictions on {}", bound);
        server.await;
        info!("Server stopped");

        Ok(())
    }

    /// All routes with rejection handling and CORS applied.
    pub fn create_routes(&self) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
        self.health_routes()
            .or(self.prediction_routes())
            .or(self.catalog_routes())
            .recover(handle_rejection)
            .with(self.cors())
    }

    fn cors(&self) -> warp::cors::Builder {
        let cors = warp::cors()
            .allow_methods(vec!["GET", "POST", "OPTIONS"])
            .allow_headers(vec!["Content-Type"]);

        if self.config.cors_allowed_origins.is_empty() {
            cors.allow_any_origin()
        } else {
            cors.allow_origins(self.config.cors_allowed_origins.iter().map(String::as_str))
        }
    }

    /// GET /
    fn health_routes(&self) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
        warp::path::end()
            .and(warp::get())
            .map(|| HEALTH_MESSAGE)
    }

    /// POST /predict
    fn prediction_routes(&self) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
        let service = self.service.clone();

        warp::path("predict")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::content_length_limit(self.config.body_limit_bytes))
            .and(warp::body::json())
            .and(warp::any().map(move || service.clone()))
            .and_then(predict)
    }

    /// GET /api/locations, GET /api/analytics
    fn catalog_routes(&self) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
        let service = self.service.clone();
        let report = AnalyticsReport::reference();

        let locations = warp::path!("api" / "locations")
            .and(warp::get())
            .map(move || warp::reply::json(&service.locations()));

        let analytics = warp::path!("api" / "analytics")
            .and(warp::get())
            .map(move || warp::reply::json(&report));

        locations.or(analytics)
    }
}

async fn predict(body: Value, service: PricingService) -> Result<WithStatus<Json>, Infallible> {
    let result = PredictionRequest::from_json(&body).and_then(|request| service.predict(&request));

    Ok(match result {
        Ok(response) => warp::reply::with_status(warp::reply::json(&response), StatusCode::OK),
        Err(err) => error_reply(&err),
    })
}

fn error_reply(err: &PriceError) -> WithStatus<Json> {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        error!(%err, "Prediction failed");
        StatusCode::INTERNAL_SERVER_ERROR
    };

    warp::reply::with_status(warp::reply::json(&ErrorResponse::from(err)), status)
}

fn json_error(message: impl Into<String>, status: StatusCode) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(&ErrorResponse::new(message)), status)
}

/// Map framework rejections to JSON error bodies.
async fn handle_rejection(err: Rejection) -> Result<WithStatus<Json>, Infallible> {
    let reply = if err.is_not_found() {
        json_error("Not Found", StatusCode::NOT_FOUND)
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        error_reply(&PriceError::MalformedRequest(e.to_string()))
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        json_error("Payload Too Large", StatusCode::PAYLOAD_TOO_LARGE)
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        json_error("Length Required", StatusCode::LENGTH_REQUIRED)
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        json_error("Unsupported Media Type", StatusCode::UNSUPPORTED_MEDIA_TYPE)
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        json_error("Method Not Allowed", StatusCode::METHOD_NOT_ALLOWED)
    } else {
        error!(?err, "Unhandled rejection");
        json_error("Internal Server Error", StatusCode::INTERNAL_SERVER_ERROR)
    };

    Ok(reply)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
