use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Liveness probe body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResponse {
    pub message: String,
}

/// Health report; `database` names the source that will serve reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub database: String,
}

pub const TEST: &str = "/test";
pub const HEALTH: &str = "/health";

pub const DATABASE_CONNECTED: &str = "Connected";
pub const DATABASE_FALLBACK: &str = "Using fallback data";
