//! Synthetic farm data.
//!
//! Used to populate an empty live store and to build the read-only fallback
//! dataset. With a fixed RNG seed the generated draws are reproducible.

use chrono::{Duration, Utc};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::db::repo_config::LocalSettings;
use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::{FarmId, FarmRecord};
use crate::services::aggregation;

pub struct StateInfo {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
    pub cities: [&'static str; 4],
}

pub const STATES: [StateInfo; 10] = [
    StateInfo { name: "Punjab", lat: 30.9293, lng: 75.5003, cities: ["Ludhiana", "Amritsar", "Jalandhar", "Patiala"] },
    StateInfo { name: "Haryana", lat: 29.0588, lng: 76.0856, cities: ["Karnal", "Hisar", "Rohtak", "Panipat"] },
    StateInfo { name: "Uttar Pradesh", lat: 26.8467, lng: 80.9462, cities: ["Lucknow", "Kanpur", "Agra", "Varanasi"] },
    StateInfo { name: "Maharashtra", lat: 19.0760, lng: 72.8777, cities: ["Pune", "Nashik", "Nagpur", "Aurangabad"] },
    StateInfo { name: "Karnataka", lat: 12.9716, lng: 77.5946, cities: ["Bangalore", "Mysore", "Hubli", "Belgaum"] },
    StateInfo { name: "Tamil Nadu", lat: 13.0827, lng: 80.2707, cities: ["Chennai", "Coimbatore", "Madurai", "Salem"] },
    StateInfo { name: "Gujarat", lat: 23.0225, lng: 72.5714, cities: ["Ahmedabad", "Surat", "Vadodara", "Rajkot"] },
    StateInfo { name: "Rajasthan", lat: 26.9124, lng: 75.7873, cities: ["Jaipur", "Jodhpur", "Udaipur", "Kota"] },
    StateInfo { name: "West Bengal", lat: 22.5726, lng: 88.3639, cities: ["Kolkata", "Howrah", "Durgapur", "Asansol"] },
    StateInfo { name: "Madhya Pradesh", lat: 23.2599, lng: 77.4126, cities: ["Bhopal", "Indore", "Gwalior", "Jabalpur"] },
];

pub const CROP_TYPES: [&str; 12] = [
    "Wheat", "Rice", "Cotton", "Sugarcane", "Maize", "Soybean", "Potato", "Tomato", "Onion",
    "Chilli", "Turmeric", "Ginger",
];

pub const FERTILIZERS: [&str; 6] = ["Organic", "NPK", "Urea", "DAP", "Potash", "Mixed"];

pub const WEATHER_CONDITIONS: [&str; 5] = ["Excellent", "Good", "Normal", "Fair", "Poor"];

pub const FARMER_NAMES: [&str; 15] = [
    "Rajesh Kumar", "Suresh Singh", "Amit Patel", "Vikram Sharma", "Ramesh Yadav",
    "Mohan Das", "Kiran Reddy", "Prakash Nair", "Anil Mehta", "Sunil Gupta",
    "Deepak Joshi", "Naveen Agarwal", "Ravi Malhotra", "Ajay Kapoor", "Sandeep Verma",
];

pub const FALLBACK_FARM_COUNT: usize = 60;
pub const FALLBACK_RNG_SEED: u64 = 42;

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Generate `count` farm listings spread across [`STATES`].
///
/// Coordinates are jittered up to ±1° around the state centre. Quantities,
/// prices and ratings are drawn from the same ranges the marketplace
/// launched with.
pub fn generate_farms<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<FarmRecord> {
    let now = Utc::now();
    (0..count)
        .map(|i| {
            let state = &STATES[rng.gen_range(0..STATES.len())];
            let city = pick(rng, &state.cities);
            let crop_type = pick(rng, &CROP_TYPES);
            let crop_quantity = rng.gen_range(500..=10_000) as f64;
            let available_quantity = rng.gen_range(100..=crop_quantity as i64) as f64;

            let mut farm = FarmRecord::new(
                FarmId::new(format!("{:032x}", rng.gen::<u128>())),
                crop_type,
            );
            farm.farm_name = Some(format!("{} Farm {}", crop_type, i + 1));
            farm.farmer_name = Some(pick(rng, &FARMER_NAMES).to_string());
            farm.city = Some(city.to_string());
            farm.state = Some(state.name.to_string());
            farm.latitude = Some(state.lat + rng.gen_range(-1.0..1.0));
            farm.longitude = Some(state.lng + rng.gen_range(-1.0..1.0));
            farm.total_quantity = Some(crop_quantity);
            farm.available_quantity = Some(available_quantity);
            farm.harvest_date = Some(now + Duration::days(rng.gen_range(-30..=90)));
            farm.predicted_yield = crop_quantity * rng.gen_range(0.8..1.2);
            farm.weather_condition = pick(rng, &WEATHER_CONDITIONS).to_string();
            farm.fertilizer_used = pick(rng, &FERTILIZERS).to_string();
            farm.market_price = Some(round2(rng.gen_range(20.0..200.0)));
            farm.quality_rating = Some(round2(rng.gen_range(3.5..5.0)));
            farm.contact_number = Some(format!(
                "+91{}",
                rng.gen_range(7_000_000_000u64..=9_999_999_999)
            ));
            farm.email = Some(format!("farmer{}@kisaanmandi.com", i + 1));
            farm.bulk_purchase_discount = rng.gen_range(5..=20) as f64;
            farm.minimum_bulk_quantity = rng.gen_range(100..=500) as f64;
            farm.created_at = now;
            farm
        })
        .collect()
}

/// The deterministic dataset served while the live store is unavailable.
pub fn fallback_dataset() -> Vec<FarmRecord> {
    let mut rng = StdRng::seed_from_u64(FALLBACK_RNG_SEED);
    generate_farms(FALLBACK_FARM_COUNT, &mut rng)
}

/// Seed farms and the derived crop catalogue if the store holds no farms.
///
/// Returns the number of farms inserted (0 when seeding is disabled or the
/// store already has data).
pub async fn initialize_data<R: FullRepository + ?Sized>(
    repo: &R,
    settings: &LocalSettings,
) -> RepositoryResult<usize> {
    if !settings.seed {
        return Ok(0);
    }
    if repo.count_farms().await? > 0 {
        info!("Data already initialized");
        return Ok(0);
    }

    info!("Initializing {} synthetic farms", settings.seed_farm_count);
    let farms = {
        let mut rng = match settings.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        generate_farms(settings.seed_farm_count, &mut rng)
    };
    let crops = aggregation::build_crop_catalogue(&farms);

    let inserted = repo.insert_farms(farms).await?;
    let crop_count = repo.insert_crops(crops).await?;
    info!("Created {} farms and {} crop records", inserted, crop_count);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::CropRepository;

    #[test]
    fn test_generated_values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let farms = generate_farms(100, &mut rng);
        assert_eq!(farms.len(), 100);
        for farm in &farms {
            let total = farm.total();
            assert!((500.0..=10_000.0).contains(&total));
            assert!((100.0..=total).contains(&farm.available()));
            assert!((20.0..=200.0).contains(&farm.price()));
            assert!((3.5..=5.0).contains(&farm.rating()));
            assert!(CROP_TYPES.contains(&farm.crop_type.as_str()));

            let state = STATES
                .iter()
                .find(|s| Some(s.name) == farm.state.as_deref())
                .unwrap();
            let (lat, lng) = farm.coordinates().unwrap();
            assert!((lat - state.lat).abs() <= 1.0);
            assert!((lng - state.lng).abs() <= 1.0);
            assert!(farm.contact_number.as_deref().unwrap().starts_with("+91"));
        }
        assert_eq!(farms[0].email.as_deref(), Some("farmer1@kisaanmandi.com"));
    }

    #[test]
    fn test_fallback_dataset_is_deterministic() {
        let a = fallback_dataset();
        let b = fallback_dataset();
        assert_eq!(a.len(), FALLBACK_FARM_COUNT);
        let ids_a: Vec<&str> = a.iter().map(|f| f.id.as_str()).collect();
        let ids_b: Vec<&str> = b.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids_a, ids_b);
        assert_eq!(a[10].available_quantity, b[10].available_quantity);
    }

    #[tokio::test]
    async fn test_initialize_seeds_only_empty_store() {
        let repo = LocalRepository::new();
        let settings = LocalSettings {
            seed_farm_count: 20,
            rng_seed: Some(1),
            ..Default::default()
        };
        assert_eq!(initialize_data(&repo, &settings).await.unwrap(), 20);
        assert!(!repo.list_crops(None).await.unwrap().is_empty());
        assert_eq!(initialize_data(&repo, &settings).await.unwrap(), 0);
        assert_eq!(repo.farm_count(), 20);
    }

    #[tokio::test]
    async fn test_seeding_can_be_disabled() {
        let repo = LocalRepository::new();
        let settings = LocalSettings {
            seed: false,
            ..Default::default()
        };
        assert_eq!(initialize_data(&repo, &settings).await.unwrap(), 0);
        assert_eq!(repo.farm_count(), 0);
    }
}
