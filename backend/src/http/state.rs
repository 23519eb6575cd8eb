//! Application state for the HTTP server.

use std::sync::Arc;
use tracing::warn;

use super::error::AppError;
use crate::db::repositories::FallbackRepository;
use crate::db::repository::FullRepository;
use crate::services::advisor::YieldAdvisor;
use crate::services::weather::WeatherService;

pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Live store; all writes go here
    pub primary: Arc<dyn FullRepository>,
    /// Read-only dataset served while the primary is unhealthy
    pub fallback: Arc<dyn FullRepository>,
    pub weather: WeatherService,
    pub advisor: YieldAdvisor,
    /// Origins allowed by the CORS layer
    pub cors_origins: Vec<String>,
}

impl AppState {
    /// State with the built-in fallback dataset and default CORS origins.
    pub fn new(
        primary: Arc<dyn FullRepository>,
        weather: WeatherService,
        advisor: YieldAdvisor,
    ) -> Self {
        Self {
            primary,
            fallback: Arc::new(FallbackRepository::default()),
            weather,
            advisor,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn FullRepository>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        if !origins.is_empty() {
            self.cors_origins = origins;
        }
        self
    }

    pub async fn primary_healthy(&self) -> bool {
        matches!(self.primary.health_check().await, Ok(true))
    }

    /// Repository that should serve reads for this request.
    pub async fn data_source(&self) -> Arc<dyn FullRepository> {
        if self.primary_healthy().await {
            self.primary.clone()
        } else {
            warn!("Primary store unavailable, serving fallback data");
            self.fallback.clone()
        }
    }

    /// The primary store, or 503 when it is down.
    pub async fn writable(&self) -> Result<Arc<dyn FullRepository>, AppError> {
        if self.primary_healthy().await {
            Ok(self.primary.clone())
        } else {
            Err(AppError::ServiceUnavailable(
                "Database not connected".to_string(),
            ))
        }
    }
}

/// Parse a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
