use serde::{Deserialize, Serialize};

use crate::models::FarmFilter;

/// Query string accepted by the farm listing.
///
/// Values arrive as raw strings so that empty parameters (`?state=`) can be
/// treated as "no constraint" rather than rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmQuery {
    #[serde(default)]
    pub crop_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub min_quantity: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl FarmQuery {
    /// Convert into an engine filter. Fails only when `minQuantity` is not a number.
    pub fn into_filter(self) -> Result<FarmFilter, String> {
        let min_quantity = match non_empty(self.min_quantity) {
            Some(raw) => Some(
                raw.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| format!("minQuantity must be a number, got '{}'", raw))?,
            ),
            None => None,
        };

        Ok(FarmFilter {
            crop_type: non_empty(self.crop_type),
            state: non_empty(self.state),
            city: non_empty(self.city),
            min_quantity,
        })
    }
}

/// Maximum farms returned by one listing.
pub const FARM_LIST_LIMIT: usize = 1000;

pub const LIST_FARMS: &str = "/farms";
pub const GET_FARM: &str = "/farms/{id}";
pub const LIST_FARMS_BY_STATE: &str = "/farms/state/{state}";
pub const LIST_FARMS_BY_CROP: &str = "/farms/crop/{crop_type}";
pub const POST_FARM_REVIEW: &str = "/farms/{id}/review";
