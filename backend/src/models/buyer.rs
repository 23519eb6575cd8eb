//! Buyer profiles and purchase history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::define_id_type;

define_id_type!(BuyerId);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuyerLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// One completed purchase from a farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farm_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    #[serde(rename = "_id")]
    pub id: BuyerId,
    pub name: String,
    pub email: String,
    pub contact_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default)]
    pub location: BuyerLocation,
    #[serde(default)]
    pub preferred_crops: Vec<String>,
    #[serde(default)]
    pub purchase_history: Vec<Purchase>,
    pub created_at: DateTime<Utc>,
}

/// Request body for registering a buyer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBuyer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub location: BuyerLocation,
    #[serde(default)]
    pub preferred_crops: Vec<String>,
}

impl NewBuyer {
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("contactNumber", &self.contact_number),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{} is required", field));
            }
        }
        Ok(())
    }

    pub fn into_buyer(self, created_at: DateTime<Utc>) -> Buyer {
        Buyer {
            id: BuyerId::generate(),
            name: self.name,
            email: self.email,
            contact_number: self.contact_number,
            company_name: self.company_name,
            location: self.location,
            preferred_crops: self.preferred_crops,
            purchase_history: Vec::new(),
            created_at,
        }
    }
}

/// Request body for appending a purchase. The server assigns the date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchase {
    #[serde(default)]
    pub farm_id: Option<String>,
    #[serde(default)]
    pub crop_type: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl NewPurchase {
    pub fn into_purchase(self, date: DateTime<Utc>) -> Purchase {
        Purchase {
            farm_id: self.farm_id,
            crop_type: self.crop_type,
            quantity: self.quantity,
            price: self.price,
            date,
            rating: self.rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buyer_requires_contact_fields() {
        let buyer = NewBuyer {
            name: "Asha Traders".to_string(),
            email: "asha@example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(buyer.validate().unwrap_err(), "contactNumber is required");
    }

    #[test]
    fn test_buyer_wire_names() {
        let buyer = NewBuyer {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            contact_number: "+919800000000".to_string(),
            ..Default::default()
        }
        .into_buyer(Utc::now());
        let json = serde_json::to_value(&buyer).unwrap();
        assert!(json["_id"].is_string());
        assert_eq!(json["contactNumber"], "+919800000000");
        assert_eq!(json["purchaseHistory"], serde_json::json!([]));
    }
}
