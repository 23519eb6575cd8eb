//! Kisaan Mandi HTTP Server Binary
//!
//! This is the main entry point for the Kisaan Mandi REST API server.
//! It initializes the repository, seeds it when empty, sets up the HTTP
//! router, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # In-memory store, seeded with synthetic farms (default)
//! cargo run --bin kisaan-server
//!
//! # Persist the store between restarts
//! DATA_FILE=data/kisaan.json cargo run --bin kisaan-server
//!
//! # Serve only the static fallback dataset
//! REPOSITORY_TYPE=fallback cargo run --bin kisaan-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 5000)
//! - `RUST_LOG`: Log level (default: info)
//! - `KISAAN_CONFIG`: Path to a `repository.toml`
//! - `REPOSITORY_TYPE`, `DATA_FILE`: Override the repository configuration
//! - `CORS_ORIGINS`: Comma-separated allowed origins
//! - `GEMINI_API_KEY`, `GEMINI_MODEL`: Generative-AI backend
//! - `WEATHER_API_URL`: Open-Meteo endpoint override

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use kisaan_mandi::db::RepositoryBuilder;
use kisaan_mandi::http::{create_router, state::parse_origins, AppState};
use kisaan_mandi::services::{initialize_data, OpenMeteoProvider, WeatherService, YieldAdvisor};

fn repository_builder() -> anyhow::Result<RepositoryBuilder> {
    let builder = RepositoryBuilder::new();
    let builder = match env::var("KISAAN_CONFIG") {
        Ok(path) => builder
            .from_config_file(&path)
            .with_context(|| format!("loading {}", path))?,
        Err(_) => match RepositoryBuilder::new().from_default_config() {
            Ok(configured) => configured,
            Err(e) => {
                info!("No repository.toml found ({}), using defaults", e);
                builder
            }
        },
    };
    // Environment variables win over the file.
    Ok(builder.from_env())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Kisaan Mandi HTTP Server");

    let builder = repository_builder()?;
    let settings = builder.settings().clone();
    let repository = builder.build()?;
    info!("Repository initialized successfully");

    match initialize_data(repository.as_ref(), &settings).await {
        Ok(0) => {}
        Ok(n) => info!("Seeded {} farms", n),
        Err(e) => warn!("Seeding failed: {}", e),
    }

    let weather = WeatherService::new(Arc::new(OpenMeteoProvider::from_env()?));
    let advisor = YieldAdvisor::from_env();

    let origins = env::var("CORS_ORIGINS")
        .map(|raw| parse_origins(&raw))
        .unwrap_or_default();

    // Create application state
    let state = AppState::new(repository, weather, advisor).with_cors_origins(origins);

    // Create router with all endpoints
    let app = create_router(state);

    // Determine bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5000);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/api/health", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
