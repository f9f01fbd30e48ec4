use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use url::Url;

use super::error::{PriceError, PriceResult};
use crate::monitoring::TelemetryConfig;

/// Prefix for environment overrides, e.g. `FLATPRICE_SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "FLATPRICE";

/// Config file read when no explicit path is given. Skipped if absent.
pub const DEFAULT_CONFIG_FILE: &str = "flat-price-api.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit_bytes: u64,
    /// Empty allows any origin.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    pub columns_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            body_limit_bytes: 16 * 1024,
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model/price_model.json"),
            columns_path: PathBuf::from("model/model_columns.json"),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> PriceResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| {
                PriceError::ConfigError(format!(
                    "invalid server address {}:{}: {}",
                    self.host, self.port, e
                ))
            })
    }

    /// Reject CORS origins that are not a bare `scheme://host[:port]`.
    pub fn validate_origins(&self) -> PriceResult<()> {
        for origin in &self.cors_allowed_origins {
            let serialized = Url::parse(origin)
                .ok()
                .map(|url| url.origin())
                .filter(|parsed| parsed.is_tuple())
                .map(|parsed| parsed.ascii_serialization());

            if serialized.as_deref() != Some(origin.as_str()) {
                return Err(PriceError::ConfigError(format!(
                    "invalid CORS origin `{}`, expected scheme://host[:port]",
                    origin
                )));
            }
        }
        Ok(())
    }
}

impl Settings {
    /// Build settings from defaults, an optional TOML file and `FLATPRICE_*`
    /// environment variables, in increasing precedence.
    ///
    /// An explicitly given file must exist; the default file may be absent.
    pub fn load(path: Option<&Path>) -> PriceResult<Self> {
        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let settings = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::from(file.as_path()).required(path.is_some()))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_allowed_origins"),
            )
            .build()?;

        let settings: Settings = settings.try_deserialize()?;
        settings.server.validate_origins()?;
        Ok(settings)
    }
}
