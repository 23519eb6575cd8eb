//! Crop catalogue entries and state distributions.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::define_id_type;

define_id_type!(CropId);

/// Summed available quantity for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateQuantity {
    pub state: String,
    pub quantity: f64,
}

/// Mapping from state name to summed available quantity.
///
/// Keys are unique. Entries keep the order in which each state was first seen
/// so that ranking ties resolve deterministically. On the wire this is a plain
/// JSON object (`{"Punjab": 100, "Haryana": 50}`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateDistribution {
    entries: Vec<StateQuantity>,
}

impl StateDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` to the running total for `state`, inserting it if unseen.
    pub fn accumulate(&mut self, state: &str, quantity: f64) {
        match self.entries.iter_mut().find(|e| e.state == state) {
            Some(entry) => entry.quantity += quantity,
            None => self.entries.push(StateQuantity {
                state: state.to_string(),
                quantity,
            }),
        }
    }

    pub fn get(&self, state: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.state == state)
            .map(|e| e.quantity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &StateQuantity> {
        self.entries.iter()
    }
}

impl FromIterator<(String, f64)> for StateDistribution {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut distribution = Self::new();
        for (state, quantity) in iter {
            distribution.accumulate(&state, quantity);
        }
        distribution
    }
}

impl Serialize for StateDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.state, &entry.quantity)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StateDistribution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DistributionVisitor;

        impl<'de> Visitor<'de> for DistributionVisitor {
            type Value = StateDistribution;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of state name to quantity")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut distribution = StateDistribution::new();
                while let Some((state, quantity)) = access.next_entry::<String, f64>()? {
                    distribution.accumulate(&state, quantity);
                }
                Ok(distribution)
            }
        }

        deserializer.deserialize_map(DistributionVisitor)
    }
}

/// Aggregated catalogue entry for one crop type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crop {
    #[serde(rename = "_id", default = "CropId::generate")]
    pub id: CropId,
    pub crop_name: String,
    pub crop_type: String,
    #[serde(default)]
    pub total_quantity: f64,
    #[serde(default)]
    pub available_quantity: f64,
    #[serde(default)]
    pub average_price: f64,
    #[serde(default)]
    pub top_producing_states: Vec<StateQuantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    #[serde(default)]
    pub harvest_months: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate_merges_duplicate_states() {
        let mut distribution = StateDistribution::new();
        distribution.accumulate("Punjab", 10.0);
        distribution.accumulate("Haryana", 5.0);
        distribution.accumulate("Punjab", 2.5);
        assert_eq!(distribution.len(), 2);
        assert_eq!(distribution.get("Punjab"), Some(12.5));
    }

    #[test]
    fn test_distribution_serializes_as_object_in_insertion_order() {
        let distribution: StateDistribution = vec![
            ("Punjab".to_string(), 100.0),
            ("Haryana".to_string(), 50.0),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_string(&distribution).unwrap();
        assert_eq!(json, r#"{"Punjab":100.0,"Haryana":50.0}"#);

        let back: StateDistribution = serde_json::from_str(&json).unwrap();
        assert_eq!(back, distribution);
    }

    #[test]
    fn test_crop_wire_names() {
        let crop = Crop {
            id: CropId::new("c1"),
            crop_name: "Wheat".to_string(),
            crop_type: "Wheat".to_string(),
            total_quantity: 1.0,
            available_quantity: 1.0,
            average_price: 1.0,
            top_producing_states: vec![],
            season: None,
            harvest_months: vec![],
        };
        let json = serde_json::to_value(&crop).unwrap();
        assert_eq!(json["_id"], "c1");
        assert!(json.get("topProducingStates").is_some());
    }
}
