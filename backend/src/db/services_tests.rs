use super::*;
use crate::db::repositories::{FallbackRepository, LocalRepository};
use crate::models::{BuyerLocation, ChatSender};

fn wheat_farm(name: &str, state: &str, available: f64) -> NewFarm {
    NewFarm {
        farm_name: name.to_string(),
        crop_type: "Wheat".to_string(),
        state: state.to_string(),
        available_quantity: Some(available),
        market_price: Some(20.0),
        ..Default::default()
    }
}

fn buyer(email: &str) -> NewBuyer {
    NewBuyer {
        name: "Asha Traders".to_string(),
        email: email.to_string(),
        contact_number: "+919800000000".to_string(),
        company_name: None,
        location: BuyerLocation::default(),
        preferred_crops: vec!["Wheat".to_string()],
    }
}

#[tokio::test]
async fn test_create_farm_requires_fields() {
    let repo = LocalRepository::new();
    let mut farm = wheat_farm("Green Acres", "Punjab", 10.0);
    farm.farm_name = String::new();
    let err = create_farm(&repo, farm).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
    assert_eq!(repo.farm_count(), 0);
}

#[tokio::test]
async fn test_crop_stats_and_top_states() {
    let repo = LocalRepository::new();
    create_farm(&repo, wheat_farm("A", "Punjab", 100.0)).await.unwrap();
    create_farm(&repo, wheat_farm("B", "Haryana", 50.0)).await.unwrap();
    create_farm(&repo, wheat_farm("C", "Punjab", 25.0)).await.unwrap();

    let stats = crop_stats(&repo, "Wheat").await.unwrap();
    assert_eq!(stats.farm_count, 3);
    assert_eq!(stats.available_quantity, 175.0);
    assert_eq!(stats.state_distribution.get("Punjab"), Some(125.0));

    let top = top_states(&repo, "Wheat", Some(1)).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].state, "Punjab");

    let all = top_states(&repo, "Wheat", None).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_review_updates_mean_rating() {
    let repo = LocalRepository::new();
    let farm = create_farm(&repo, wheat_farm("A", "Punjab", 10.0)).await.unwrap();

    for rating in [5.0, 4.0, 3.0] {
        let review = NewReview {
            buyer_id: Some("b1".to_string()),
            rating,
            comment: None,
        };
        add_review(&repo, &farm.id, review).await.unwrap();
    }

    let stored = get_farm(&repo, &farm.id).await.unwrap();
    assert_eq!(stored.quality_reviews.len(), 3);
    assert_eq!(stored.quality_rating, Some(4.0));
}

#[tokio::test]
async fn test_review_rejects_out_of_range_rating() {
    let repo = LocalRepository::new();
    let farm = create_farm(&repo, wheat_farm("A", "Punjab", 10.0)).await.unwrap();
    let review = NewReview {
        buyer_id: None,
        rating: 7.0,
        comment: None,
    };
    let err = add_review(&repo, &farm.id, review).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
}

#[tokio::test]
async fn test_duplicate_buyer_email_is_rejected() {
    let repo = LocalRepository::new();
    create_buyer(&repo, buyer("asha@example.com")).await.unwrap();
    let err = create_buyer(&repo, buyer("asha@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
    assert_eq!(repo.buyer_count(), 1);
}

#[tokio::test]
async fn test_purchase_is_appended() {
    let repo = LocalRepository::new();
    let created = create_buyer(&repo, buyer("ravi@example.com")).await.unwrap();
    let purchase = NewPurchase {
        farm_id: Some("f1".to_string()),
        crop_type: Some("Rice".to_string()),
        quantity: Some(200.0),
        price: Some(32.5),
        rating: None,
    };
    let updated = add_purchase(&repo, &created.id, purchase).await.unwrap();
    assert_eq!(updated.purchase_history.len(), 1);
    assert_eq!(updated.purchase_history[0].quantity, Some(200.0));
}

#[tokio::test]
async fn test_chat_get_or_create_is_idempotent() {
    let repo = LocalRepository::new();
    let first = get_chat(&repo, "b1", "f1").await.unwrap();
    let again = get_chat(&repo, "b1", "f1").await.unwrap();
    assert_eq!(first.id, again.id);
    assert_eq!(repo.chat_count(), 1);

    let message = NewMessage {
        sender: ChatSender::Buyer,
        message: "Is 500kg available?".to_string(),
    };
    let chat = send_message(&repo, "b1", "f1", message).await.unwrap();
    assert_eq!(chat.id, first.id);
    assert_eq!(chat.messages.len(), 1);
    assert!(chat.updated_at >= first.updated_at);
}

#[tokio::test]
async fn test_empty_message_is_rejected() {
    let repo = LocalRepository::new();
    let message = NewMessage {
        sender: ChatSender::Farmer,
        message: "   ".to_string(),
    };
    assert!(send_message(&repo, "b1", "f1", message).await.is_err());
    assert_eq!(repo.chat_count(), 0);
}

#[tokio::test]
async fn test_fallback_serves_reads_and_rejects_writes() {
    let repo = FallbackRepository::default();
    let heat = heatmap(&repo).await.unwrap();
    assert_eq!(heat.len(), repo.farms().len());
    assert!(!list_crops(&repo).await.unwrap().is_empty());

    let err = create_buyer(&repo, buyer("x@example.com")).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ConnectionError { .. }));
}
