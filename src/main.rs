use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::info;

use flat_price_api::api::PriceApiServer;
use flat_price_api::core::Settings;
use flat_price_api::monitoring::{self, LogLevel};
use flat_price_api::track_performance;
use flat_price_api::{PredictionRequest, PricingService};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML settings file
    #[arg(short, long, env = "FLATPRICE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Model artifact (JSON)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Column schema file (JSON array of column names)
    #[arg(long)]
    columns: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve predictions over HTTP (default)
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,
        /// Bind port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Predict a single price and print it as JSON
    Predict {
        /// Built-up area in square feet
        #[arg(long)]
        area: f64,
        /// Bedroom count
        #[arg(long)]
        bhk: i64,
        /// Location name as listed by `locations`
        #[arg(long)]
        location: String,
    },
    /// Print the locations known to the model as JSON
    Locations,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenv().ok();

    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(level) = cli.log_level {
        settings.telemetry.log_level = level;
    }
    if let Some(model) = cli.model {
        settings.model.model_path = model;
    }
    if let Some(columns) = cli.columns {
        settings.model.columns_path = columns;
    }

    monitoring::init_telemetry(&settings.telemetry)?;

    let service = PricingService::load(&settings.model).with_context(|| {
        format!(
            "Failed to load model {} with columns {}",
            settings.model.model_path.display(),
            settings.model.columns_path.display()
        )
    })?;

    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }

            info!("Flat price API starting up...");
            PriceApiServer::new(settings.server, service)?.start().await?;
        }
        Commands::Predict { area, bhk, location } => {
            track_performance!("cli_predict");
            let response = service.predict(&PredictionRequest::new(area, bhk, location))?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Locations => {
            println!("{}", serde_json::to_string_pretty(&service.locations())?);
        }
    }

    Ok(())
}
