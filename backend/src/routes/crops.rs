use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{StateDistribution, StateQuantity};

// =========================================================
// Crop statistics, availability and heatmap types + routes
// =========================================================

/// Aggregated statistics for one crop type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropSummary {
    pub crop_type: String,
    pub total_quantity: f64,
    pub available_quantity: f64,
    /// Unweighted mean of market price over matching farms; 0 when none match.
    pub average_price: f64,
    pub farm_count: usize,
    #[serde(rename = "stateWiseDistribution")]
    pub state_distribution: StateDistribution,
}

impl CropSummary {
    pub fn empty(crop_type: impl Into<String>) -> Self {
        Self {
            crop_type: crop_type.into(),
            total_quantity: 0.0,
            available_quantity: 0.0,
            average_price: 0.0,
            farm_count: 0,
            state_distribution: StateDistribution::new(),
        }
    }
}

/// Map-plottable projection of a farm record.
///
/// Coordinates and city are emitted under two key names each
/// (`latitude`/`lat`, `longitude`/`lng`, `city`/`nearestCity`) because the
/// heatmap library and the list view read different keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub lat: f64,
    pub lng: f64,
    pub crop_type: String,
    pub quantity: f64,
    pub state: Option<String>,
    pub city: Option<String>,
    pub nearest_city: Option<String>,
    pub price: f64,
    pub farm_name: Option<String>,
    /// `quantity / 1000`, unclamped.
    pub intensity: f64,
}

/// Per-farm availability of one crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityEntry {
    pub farm_id: String,
    pub farm_name: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub quantity: f64,
    pub price: f64,
    pub harvest_date: Option<DateTime<Utc>>,
    pub quality_rating: f64,
}

/// Query parameters for the top-states view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopStatesQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

pub type TopStates = Vec<StateQuantity>;

/// Number of producing states shown when the caller does not ask for a limit.
pub const DEFAULT_TOP_STATES: usize = 5;
/// Maximum catalogue entries returned by the crop listing.
pub const CROP_LIST_LIMIT: usize = 100;

pub const LIST_CROPS: &str = "/crops";
pub const GET_CROP_STATS: &str = "/crops/stats/{crop_type}";
pub const GET_TOP_STATES: &str = "/crops/stats/{crop_type}/top-states";
pub const GET_CROP_AVAILABILITY: &str = "/crops/availability/{crop_type}";
pub const GET_HEATMAP: &str = "/crops/heatmap/all";
