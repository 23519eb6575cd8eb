//! Farm listing documents.
//!
//! A [`FarmRecord`] is one seller's crop listing. The serde layout matches the
//! document shape the frontend already consumes (`_id`, `nearestCity`,
//! `cropQuantity`, ...). Numeric fields are optional on the wire: records coming
//! from older documents or hand-written fixtures may lack them, and the
//! accessor methods below resolve every absent or invalid amount to `0.0`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::define_id_type;

define_id_type!(FarmId);

pub const DEFAULT_WEATHER_CONDITION: &str = "Normal";
pub const DEFAULT_FERTILIZER: &str = "Organic";
pub const DEFAULT_MINIMUM_BULK_QUANTITY: f64 = 100.0;
pub const MAX_QUALITY_RATING: f64 = 5.0;

fn default_weather_condition() -> String {
    DEFAULT_WEATHER_CONDITION.to_string()
}

fn default_fertilizer() -> String {
    DEFAULT_FERTILIZER.to_string()
}

fn default_minimum_bulk_quantity() -> f64 {
    DEFAULT_MINIMUM_BULK_QUANTITY
}

/// Resolve an optional amount: absent, non-finite or negative values count as zero.
pub fn amount_or_zero(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// A buyer's review of a farm's produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReview {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_id: Option<String>,
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub date: DateTime<Utc>,
}

/// A farm listing as stored by the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmRecord {
    #[serde(rename = "_id", default = "FarmId::generate")]
    pub id: FarmId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farm_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farmer_name: Option<String>,
    #[serde(default)]
    pub crop_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(rename = "nearestCity", default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(
        rename = "cropQuantity",
        alias = "totalQuantity",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub total_quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harvest_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub predicted_yield: f64,
    #[serde(default = "default_weather_condition")]
    pub weather_condition: String,
    #[serde(default = "default_fertilizer")]
    pub fertilizer_used: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_rating: Option<f64>,
    #[serde(default)]
    pub quality_reviews: Vec<QualityReview>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub bulk_purchase_discount: f64,
    #[serde(default = "default_minimum_bulk_quantity")]
    pub minimum_bulk_quantity: f64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl FarmRecord {
    /// Minimal record with only identity and crop type set; every other field
    /// takes its document default.
    pub fn new(id: impl Into<FarmId>, crop_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            farm_name: None,
            farmer_name: None,
            crop_type: crop_type.into(),
            state: None,
            city: None,
            latitude: None,
            longitude: None,
            total_quantity: None,
            available_quantity: None,
            harvest_date: None,
            predicted_yield: 0.0,
            weather_condition: default_weather_condition(),
            fertilizer_used: default_fertilizer(),
            market_price: None,
            quality_rating: None,
            quality_reviews: Vec::new(),
            contact_number: None,
            email: None,
            bulk_purchase_discount: 0.0,
            minimum_bulk_quantity: DEFAULT_MINIMUM_BULK_QUANTITY,
            created_at: Utc::now(),
        }
    }

    pub fn available(&self) -> f64 {
        amount_or_zero(self.available_quantity)
    }

    pub fn total(&self) -> f64 {
        amount_or_zero(self.total_quantity)
    }

    pub fn price(&self) -> f64 {
        amount_or_zero(self.market_price)
    }

    pub fn rating(&self) -> f64 {
        amount_or_zero(self.quality_rating).min(MAX_QUALITY_RATING)
    }

    /// State label, treating an empty string as absent.
    pub fn state_label(&self) -> Option<&str> {
        self.state.as_deref().filter(|s| !s.is_empty())
    }

    /// Both coordinates, if present and finite.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some((lat, lng)),
            _ => None,
        }
    }

    /// Append a review and recompute `quality_rating` as the mean of all review ratings.
    pub fn add_review(&mut self, review: QualityReview) {
        self.quality_reviews.push(review);
        let total: f64 = self.quality_reviews.iter().map(|r| r.rating).sum();
        self.quality_rating = Some(total / self.quality_reviews.len() as f64);
    }
}

/// Predicate fields for farm listing queries. Unset fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FarmFilter {
    /// Exact, case-sensitive crop type.
    pub crop_type: Option<String>,
    /// Exact, case-sensitive state.
    pub state: Option<String>,
    /// Case-insensitive substring of the nearest city.
    pub city: Option<String>,
    /// Inclusive lower bound on available quantity.
    pub min_quantity: Option<f64>,
}

impl FarmFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn crop_type(mut self, crop_type: impl Into<String>) -> Self {
        self.crop_type = Some(crop_type.into());
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn min_quantity(mut self, min_quantity: f64) -> Self {
        self.min_quantity = Some(min_quantity);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.crop_type.is_none()
            && self.state.is_none()
            && self.city.is_none()
            && self.min_quantity.is_none()
    }
}

/// Request body for creating a farm listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFarm {
    #[serde(default)]
    pub farm_name: String,
    #[serde(default)]
    pub farmer_name: Option<String>,
    #[serde(default)]
    pub crop_type: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub nearest_city: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, alias = "totalQuantity")]
    pub crop_quantity: Option<f64>,
    #[serde(default)]
    pub available_quantity: Option<f64>,
    #[serde(default)]
    pub harvest_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub market_price: Option<f64>,
    #[serde(default)]
    pub weather_condition: Option<String>,
    #[serde(default)]
    pub fertilizer_used: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bulk_purchase_discount: Option<f64>,
    #[serde(default)]
    pub minimum_bulk_quantity: Option<f64>,
}

impl NewFarm {
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("farmName", &self.farm_name),
            ("cropType", &self.crop_type),
            ("state", &self.state),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{} is required", field));
            }
        }
        Ok(())
    }

    pub fn into_record(self) -> FarmRecord {
        let mut record = FarmRecord::new(FarmId::generate(), self.crop_type);
        record.farm_name = Some(self.farm_name);
        record.farmer_name = self.farmer_name;
        record.state = Some(self.state);
        record.city = self.nearest_city;
        record.latitude = self.latitude;
        record.longitude = self.longitude;
        record.total_quantity = self.crop_quantity;
        record.available_quantity = self.available_quantity;
        record.harvest_date = self.harvest_date;
        record.market_price = self.market_price;
        if let Some(weather) = self.weather_condition {
            record.weather_condition = weather;
        }
        if let Some(fertilizer) = self.fertilizer_used {
            record.fertilizer_used = fertilizer;
        }
        record.contact_number = self.contact_number;
        record.email = self.email;
        record.bulk_purchase_discount = self.bulk_purchase_discount.unwrap_or(0.0);
        record.minimum_bulk_quantity = self
            .minimum_bulk_quantity
            .unwrap_or(DEFAULT_MINIMUM_BULK_QUANTITY);
        record
    }
}

/// Partial update for a farm listing. Only fields present in the body change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmUpdate {
    #[serde(default)]
    pub farm_name: Option<String>,
    #[serde(default)]
    pub farmer_name: Option<String>,
    #[serde(default)]
    pub crop_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub nearest_city: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, alias = "totalQuantity")]
    pub crop_quantity: Option<f64>,
    #[serde(default)]
    pub available_quantity: Option<f64>,
    #[serde(default)]
    pub harvest_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub predicted_yield: Option<f64>,
    #[serde(default)]
    pub weather_condition: Option<String>,
    #[serde(default)]
    pub fertilizer_used: Option<String>,
    #[serde(default)]
    pub market_price: Option<f64>,
    #[serde(default)]
    pub quality_rating: Option<f64>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bulk_purchase_discount: Option<f64>,
    #[serde(default)]
    pub minimum_bulk_quantity: Option<f64>,
}

impl FarmUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(rating) = self.quality_rating {
            if !(0.0..=MAX_QUALITY_RATING).contains(&rating) {
                return Err(format!(
                    "qualityRating must be between 0 and {}, got {}",
                    MAX_QUALITY_RATING, rating
                ));
            }
        }
        if matches!(self.crop_type.as_deref(), Some(c) if c.trim().is_empty()) {
            return Err("cropType cannot be empty".to_string());
        }
        Ok(())
    }

    pub fn apply(self, farm: &mut FarmRecord) {
        if let Some(v) = self.farm_name {
            farm.farm_name = Some(v);
        }
        if let Some(v) = self.farmer_name {
            farm.farmer_name = Some(v);
        }
        if let Some(v) = self.crop_type {
            farm.crop_type = v;
        }
        if let Some(v) = self.state {
            farm.state = Some(v);
        }
        if let Some(v) = self.nearest_city {
            farm.city = Some(v);
        }
        if let Some(v) = self.latitude {
            farm.latitude = Some(v);
        }
        if let Some(v) = self.longitude {
            farm.longitude = Some(v);
        }
        if let Some(v) = self.crop_quantity {
            farm.total_quantity = Some(v);
        }
        if let Some(v) = self.available_quantity {
            farm.available_quantity = Some(v);
        }
        if let Some(v) = self.harvest_date {
            farm.harvest_date = Some(v);
        }
        if let Some(v) = self.predicted_yield {
            farm.predicted_yield = v;
        }
        if let Some(v) = self.weather_condition {
            farm.weather_condition = v;
        }
        if let Some(v) = self.fertilizer_used {
            farm.fertilizer_used = v;
        }
        if let Some(v) = self.market_price {
            farm.market_price = Some(v);
        }
        if let Some(v) = self.quality_rating {
            farm.quality_rating = Some(v);
        }
        if let Some(v) = self.contact_number {
            farm.contact_number = Some(v);
        }
        if let Some(v) = self.email {
            farm.email = Some(v);
        }
        if let Some(v) = self.bulk_purchase_discount {
            farm.bulk_purchase_discount = v;
        }
        if let Some(v) = self.minimum_bulk_quantity {
            farm.minimum_bulk_quantity = v;
        }
    }
}

/// Request body for adding a quality review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    #[serde(default)]
    pub buyer_id: Option<String>,
    pub rating: f64,
    #[serde(default)]
    pub comment: Option<String>,
}

impl NewReview {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=MAX_QUALITY_RATING).contains(&self.rating) {
            return Err(format!(
                "rating must be between 0 and {}, got {}",
                MAX_QUALITY_RATING, self.rating
            ));
        }
        Ok(())
    }

    pub fn into_review(self, date: DateTime<Utc>) -> QualityReview {
        QualityReview {
            buyer_id: self.buyer_id,
            rating: self.rating,
            comment: self.comment,
            date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_numeric_fields_resolve_to_zero() {
        let farm: FarmRecord =
            serde_json::from_str(r#"{"_id":"f1","cropType":"Wheat"}"#).unwrap();
        assert_eq!(farm.available(), 0.0);
        assert_eq!(farm.total(), 0.0);
        assert_eq!(farm.price(), 0.0);
        assert_eq!(farm.rating(), 0.0);
        assert_eq!(farm.weather_condition, "Normal");
        assert_eq!(farm.fertilizer_used, "Organic");
        assert_eq!(farm.minimum_bulk_quantity, 100.0);
    }

    #[test]
    fn test_invalid_amounts_resolve_to_zero() {
        assert_eq!(amount_or_zero(Some(f64::NAN)), 0.0);
        assert_eq!(amount_or_zero(Some(f64::INFINITY)), 0.0);
        assert_eq!(amount_or_zero(Some(-3.0)), 0.0);
        assert_eq!(amount_or_zero(Some(12.5)), 12.5);
    }

    #[test]
    fn test_wire_names() {
        let mut farm = FarmRecord::new("f1", "Rice");
        farm.city = Some("Karnal".to_string());
        farm.total_quantity = Some(900.0);
        let json = serde_json::to_value(&farm).unwrap();
        assert_eq!(json["_id"], "f1");
        assert_eq!(json["nearestCity"], "Karnal");
        assert_eq!(json["cropQuantity"], 900.0);
        assert!(json.get("latitude").is_none());
    }

    #[test]
    fn test_total_quantity_alias() {
        let farm: FarmRecord =
            serde_json::from_str(r#"{"_id":"f1","cropType":"Wheat","totalQuantity":40}"#).unwrap();
        assert_eq!(farm.total(), 40.0);
    }

    #[test]
    fn test_coordinates_require_both() {
        let mut farm = FarmRecord::new("f1", "Rice");
        farm.latitude = Some(10.0);
        assert!(farm.coordinates().is_none());
        farm.longitude = Some(0.0);
        assert_eq!(farm.coordinates(), Some((10.0, 0.0)));
    }

    #[test]
    fn test_add_review_recomputes_mean() {
        let mut farm = FarmRecord::new("f1", "Rice");
        farm.quality_rating = Some(4.9);
        farm.add_review(NewReview { buyer_id: None, rating: 4.0, comment: None }.into_review(Utc::now()));
        farm.add_review(NewReview { buyer_id: None, rating: 3.0, comment: None }.into_review(Utc::now()));
        assert_eq!(farm.quality_reviews.len(), 2);
        assert_eq!(farm.quality_rating, Some(3.5));
    }

    #[test]
    fn test_update_rejects_out_of_range_rating() {
        let update = FarmUpdate {
            quality_rating: Some(5.5),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_update_only_touches_present_fields() {
        let mut farm = FarmRecord::new("f1", "Rice");
        farm.state = Some("Punjab".to_string());
        let update: FarmUpdate = serde_json::from_str(r#"{"availableQuantity":75}"#).unwrap();
        update.apply(&mut farm);
        assert_eq!(farm.available(), 75.0);
        assert_eq!(farm.state.as_deref(), Some("Punjab"));
        assert_eq!(farm.crop_type, "Rice");
    }

    #[test]
    fn test_new_farm_requires_name_crop_and_state() {
        let farm = NewFarm {
            farm_name: "Green Acres".to_string(),
            crop_type: "Wheat".to_string(),
            state: " ".to_string(),
            ..Default::default()
        };
        assert!(farm.validate().unwrap_err().contains("state"));
    }

    #[test]
    fn test_filter_builder() {
        assert!(FarmFilter::new().is_empty());
        let filter = FarmFilter::new().crop_type("Wheat").min_quantity(10.0);
        assert!(!filter.is_empty());
        assert_eq!(filter.crop_type.as_deref(), Some("Wheat"));
    }
}
