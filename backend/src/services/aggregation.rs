//! Aggregation and filtering over farm snapshots.
//!
//! Every function here is a pure function of a borrowed slice of
//! [`FarmRecord`]s. Nothing is mutated, nothing fails, and every numeric
//! aggregate of an empty input is `0.0`. Amounts are read through the record
//! accessors, so absent, negative or non-finite values count as zero.

use crate::models::{Crop, CropId, FarmFilter, FarmRecord, StateDistribution, StateQuantity};
use crate::routes::crops::{AvailabilityEntry, CropSummary, HeatPoint};

/// Number of producing states kept on a catalogue entry.
pub const CATALOGUE_TOP_STATES: usize = 5;
pub const CATALOGUE_SEASON: &str = "All Season";
pub const CATALOGUE_HARVEST_MONTHS: [&str; 6] =
    ["January", "February", "March", "April", "May", "June"];

/// Heat intensity is available quantity expressed in thousands.
const INTENSITY_SCALE: f64 = 1000.0;

/// Summary statistics for the records whose crop type equals `crop_type` exactly.
///
/// An unknown crop type yields [`CropSummary::empty`]. The price average is an
/// unweighted mean over matching records, and the state distribution sums
/// available quantity over records with a non-empty state.
pub fn summarize_by_crop_type(records: &[FarmRecord], crop_type: &str) -> CropSummary {
    let mut summary = CropSummary::empty(crop_type);
    let mut price_sum = 0.0;

    for record in records.iter().filter(|r| r.crop_type == crop_type) {
        summary.farm_count += 1;
        summary.total_quantity += record.total();
        summary.available_quantity += record.available();
        price_sum += record.price();
        if let Some(state) = record.state_label() {
            summary.state_distribution.accumulate(state, record.available());
        }
    }

    if summary.farm_count > 0 {
        summary.average_price = price_sum / summary.farm_count as f64;
    }
    summary
}

/// States ordered by quantity, largest first.
///
/// The sort is stable: equal quantities keep the distribution's first-seen
/// order. No cap is applied; callers truncate.
pub fn rank_states(distribution: &StateDistribution) -> Vec<StateQuantity> {
    let mut ranked: Vec<StateQuantity> = distribution.iter().cloned().collect();
    ranked.sort_by(|a, b| b.quantity.total_cmp(&a.quantity));
    ranked
}

/// Map points for every record that carries both coordinates, in input order.
///
/// The iterator borrows `records`; call again to restart.
pub fn to_heat_points(records: &[FarmRecord]) -> impl Iterator<Item = HeatPoint> + '_ {
    records.iter().filter_map(|record| {
        let (lat, lng) = record.coordinates()?;
        let quantity = record.available();
        Some(HeatPoint {
            latitude: lat,
            longitude: lng,
            lat,
            lng,
            crop_type: record.crop_type.clone(),
            quantity,
            state: record.state.clone(),
            city: record.city.clone(),
            nearest_city: record.city.clone(),
            price: record.price(),
            farm_name: record.farm_name.clone(),
            intensity: quantity / INTENSITY_SCALE,
        })
    })
}

/// Whether `record` satisfies every constraint set on `filter`.
pub fn matches(record: &FarmRecord, filter: &FarmFilter) -> bool {
    if let Some(crop_type) = &filter.crop_type {
        if &record.crop_type != crop_type {
            return false;
        }
    }
    if let Some(state) = &filter.state {
        if record.state.as_ref() != Some(state) {
            return false;
        }
    }
    if let Some(city) = &filter.city {
        let needle = city.to_lowercase();
        match &record.city {
            Some(c) if c.to_lowercase().contains(&needle) => {}
            _ => return false,
        }
    }
    if let Some(min) = filter.min_quantity {
        if record.available() < min {
            return false;
        }
    }
    true
}

/// Records satisfying every set constraint of `filter`, in input order.
pub fn filter_records(records: &[FarmRecord], filter: &FarmFilter) -> Vec<FarmRecord> {
    records
        .iter()
        .filter(|r| matches(r, filter))
        .cloned()
        .collect()
}

/// Per-farm availability projection.
pub fn to_availability(records: &[FarmRecord]) -> Vec<AvailabilityEntry> {
    records
        .iter()
        .map(|record| AvailabilityEntry {
            farm_id: record.id.to_string(),
            farm_name: record.farm_name.clone(),
            state: record.state.clone(),
            city: record.city.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
            quantity: record.available(),
            price: record.price(),
            harvest_date: record.harvest_date,
            quality_rating: record.rating(),
        })
        .collect()
}

/// One catalogue entry per distinct crop type, in first-seen order.
///
/// Records with an empty crop type are skipped.
pub fn build_crop_catalogue(records: &[FarmRecord]) -> Vec<Crop> {
    let mut crop_types: Vec<&str> = Vec::new();
    for record in records {
        let crop_type = record.crop_type.as_str();
        if !crop_type.is_empty() && !crop_types.contains(&crop_type) {
            crop_types.push(crop_type);
        }
    }

    crop_types
        .into_iter()
        .map(|crop_type| {
            let summary = summarize_by_crop_type(records, crop_type);
            let mut top = rank_states(&summary.state_distribution);
            top.truncate(CATALOGUE_TOP_STATES);
            Crop {
                id: CropId::generate(),
                crop_name: crop_type.to_string(),
                crop_type: crop_type.to_string(),
                total_quantity: summary.total_quantity,
                available_quantity: summary.available_quantity,
                average_price: summary.average_price,
                top_producing_states: top,
                season: Some(CATALOGUE_SEASON.to_string()),
                harvest_months: CATALOGUE_HARVEST_MONTHS
                    .iter()
                    .map(|m| m.to_string())
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_all_zero() {
        let summary = summarize_by_crop_type(&[], "Wheat");
        assert_eq!(summary, CropSummary::empty("Wheat"));
        assert!(rank_states(&summary.state_distribution).is_empty());
        assert_eq!(to_heat_points(&[]).count(), 0);
        assert!(build_crop_catalogue(&[]).is_empty());
    }

    #[test]
    fn test_crop_type_match_is_case_sensitive() {
        let records = vec![FarmRecord::new("f1", "wheat")];
        assert_eq!(summarize_by_crop_type(&records, "Wheat").farm_count, 0);
    }
}

#[cfg(test)]
#[path = "aggregation_tests.rs"]
mod aggregation_tests;
