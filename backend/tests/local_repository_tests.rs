//! LocalRepository behaviour through the service layer, including JSON snapshots.

use kisaan_mandi::db::repositories::LocalRepository;
use kisaan_mandi::db::repo_config::LocalSettings;
use kisaan_mandi::db::repository::{BuyerRepository, ChatRepository, FarmRepository};
use kisaan_mandi::db::services;
use kisaan_mandi::models::{BuyerLocation, ChatSender, FarmFilter, NewBuyer, NewFarm, NewMessage};
use kisaan_mandi::services::seed::initialize_data;

fn farm(name: &str, crop: &str, state: &str) -> NewFarm {
    NewFarm {
        farm_name: name.to_string(),
        crop_type: crop.to_string(),
        state: state.to_string(),
        available_quantity: Some(120.0),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_snapshot_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kisaan.json");

    {
        let repo = LocalRepository::with_snapshot(&path).unwrap();
        services::create_farm(&repo, farm("Green Acres", "Rice", "Punjab"))
            .await
            .unwrap();
        let buyer = NewBuyer {
            name: "Asha Traders".to_string(),
            email: "asha@example.com".to_string(),
            contact_number: "+919800000000".to_string(),
            company_name: None,
            location: BuyerLocation::default(),
            preferred_crops: vec![],
        };
        services::create_buyer(&repo, buyer).await.unwrap();
        let message = NewMessage {
            sender: ChatSender::Farmer,
            message: "Harvest is ready".to_string(),
        };
        services::send_message(&repo, "b1", "f1", message).await.unwrap();
    }
    assert!(path.exists());

    let reopened = LocalRepository::with_snapshot(&path).unwrap();
    assert_eq!(reopened.farm_count(), 1);
    assert_eq!(reopened.list_buyers().await.unwrap()[0].email, "asha@example.com");
    let chat = reopened.get_or_create_chat("b1", "f1").await.unwrap();
    assert_eq!(chat.messages.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_writes_all_reach_snapshot() {
    for round in 0..10 {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kisaan.json");
        let repo = LocalRepository::with_snapshot(&path).unwrap();

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    services::create_farm(&repo, farm(&format!("Farm {}", i), "Wheat", "Punjab"))
                        .await
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(repo.farm_count(), 64);

        let reopened = LocalRepository::with_snapshot(&path).unwrap();
        assert_eq!(reopened.farm_count(), 64, "round {}", round);
    }
}

#[tokio::test]
async fn test_corrupt_snapshot_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kisaan.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(LocalRepository::with_snapshot(&path).is_err());
}

#[tokio::test]
async fn test_seeded_store_is_reproducible() {
    let settings = LocalSettings {
        seed_farm_count: 30,
        rng_seed: Some(9),
        ..Default::default()
    };
    let a = LocalRepository::new();
    let b = LocalRepository::new();
    initialize_data(&a, &settings).await.unwrap();
    initialize_data(&b, &settings).await.unwrap();

    let all = FarmFilter::new();
    let farms_a = a.list_farms(&all, None).await.unwrap();
    let farms_b = b.list_farms(&all, None).await.unwrap();
    assert_eq!(farms_a.len(), 30);
    for (x, y) in farms_a.iter().zip(&farms_b) {
        assert_eq!(x.id, y.id);
        assert_eq!(x.available_quantity, y.available_quantity);
        assert_eq!(x.state, y.state);
    }
}

#[tokio::test]
async fn test_unhealthy_store_rejects_calls() {
    let repo = LocalRepository::new();
    services::create_farm(&repo, farm("A", "Rice", "Goa")).await.unwrap();
    repo.set_healthy(false);

    assert!(services::list_farms(&repo, &FarmFilter::new()).await.is_err());
    assert!(!repo.health_check().await.unwrap_or(false));

    repo.set_healthy(true);
    assert_eq!(
        services::list_farms(&repo, &FarmFilter::new())
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_clones_share_documents() {
    let repo = LocalRepository::new();
    let handle = repo.clone();
    services::create_farm(&handle, farm("A", "Rice", "Goa")).await.unwrap();
    assert_eq!(repo.farm_count(), 1);
    repo.clear();
    assert_eq!(handle.farm_count(), 0);
}
