use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::anyhow;
use axum::Router;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use reserva_gateway::{ServerConfig, handlers, routes, state::AppState};

/// Reserva Gateway - Voice reservation webhook server
#[derive(Parser, Debug)]
#[command(name = "reserva-gateway")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration from file or environment; fails fast when the model
    // API key is absent
    let config = if let Some(config_path) = cli.config {
        println!("Loading configuration from {}", config_path.display());
        ServerConfig::from_file(&config_path).map_err(|e| anyhow!(e.to_string()))?
    } else {
        ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?
    };

    let address = config.address();
    let extractor_mode = config.extractor_mode;

    // Create application state
    let app_state = AppState::new(config).map_err(|e| anyhow!(e.to_string()))?;

    // Telephony webhook routes (no auth - the provider posts form-encoded turns)
    let voice_routes = routes::voice::create_voice_router();

    // Read-side API routes
    let api_routes = routes::api::create_api_router();

    // Public health check route
    let public_routes = Router::new().route(
        "/",
        axum::routing::get(handlers::api::health_check),
    );

    let app = public_routes
        .merge(voice_routes)
        .merge(api_routes)
        .with_state(app_state);

    // Parse socket address
    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;

    info!(%socket_addr, %extractor_mode, "starting voice reservation gateway");
    println!("Server listening on http://{}", socket_addr);

    let listener = TcpListener::bind(&socket_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
