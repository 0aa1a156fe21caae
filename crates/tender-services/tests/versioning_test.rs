mod helpers;

use helpers::setup_test_app;
use tender_core::models::{BidPatch, BidStatus, HistoryRecord, TenderPatch, TenderStatus, Versioned};
use tender_core::AppError;
use uuid::Uuid;

#[tokio::test]
async fn test_version_monotonicity() {
    let app = setup_test_app();
    let org = app.organization("acme", 1).await;
    let owner = &org.owner().username;
    let tender = app.create_tender(&org, "Bridge", "Construction").await;
    assert_eq!(tender.version, 1);

    let names = ["Bridge v2", "Bridge v3", "Bridge v4", "Bridge v5"];
    for (i, name) in names.iter().enumerate() {
        let updated = app
            .engine
            .tenders
            .edit(
                owner,
                tender.id,
                TenderPatch {
                    name: Some(name.to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.version, i as i32 + 2);
    }

    let current = app.tender(tender.id).await;
    assert_eq!(current.version, names.len() as i32 + 1);

    let history = app.tender_history(tender.id).await;
    let versions: Vec<i32> = history.iter().map(|h| h.version()).collect();
    assert_eq!(versions, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_history_fidelity() {
    let app = setup_test_app();
    let org = app.organization("acme", 1).await;
    let owner = &org.owner().username;
    let tender = app.create_tender(&org, "Bridge", "Construction").await;

    let mut before = vec![tender.content()];
    let published = app
        .engine
        .tenders
        .set_status(owner, tender.id, "Published")
        .await
        .unwrap();
    before.push(published.content());
    let edited = app
        .engine
        .tenders
        .edit(
            owner,
            tender.id,
            TenderPatch {
                description: Some("Longer bridge".to_string()),
                service_type: Some("Delivery".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    app.engine
        .tenders
        .set_status(owner, tender.id, "Closed")
        .await
        .unwrap();
    before.push(edited.content());

    let history = app.tender_history(tender.id).await;
    assert_eq!(history.len(), 3);
    for (record, expected) in history.iter().zip(before.iter()) {
        assert_eq!(&record.content(), expected);
        assert_eq!(record.tender_id, tender.id);
    }
    assert_eq!(history[1].status, TenderStatus::Published);
    assert_eq!(history[1].description, "Bridge description");
}

#[tokio::test]
async fn test_tender_rollback_restores_content_as_new_version() {
    let app = setup_test_app();
    let org = app.organization("acme", 1).await;
    let owner = &org.owner().username;
    let tender = app.create_tender(&org, "Bridge", "Construction").await;

    for name in ["Tunnel", "Dam"] {
        app.engine
            .tenders
            .edit(
                owner,
                tender.id,
                TenderPatch {
                    name: Some(name.to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }
    let before_rollback = app.tender(tender.id).await;
    assert_eq!(before_rollback.version, 3);

    let restored = app.engine.tenders.rollback(owner, tender.id, 2).await.unwrap();
    assert_eq!(restored.name, "Tunnel");
    assert_eq!(restored.version, 4);

    let history = app.tender_history(tender.id).await;
    assert_eq!(history.len(), 3);
    let last = history.last().unwrap();
    assert_eq!(last.version(), 3);
    assert_eq!(last.content(), before_rollback.content());
}

#[tokio::test]
async fn test_rollback_to_unknown_version() {
    let app = setup_test_app();
    let org = app.organization("acme", 1).await;
    let owner = &org.owner().username;
    let tender = app.create_tender(&org, "Bridge", "Construction").await;

    let err = app.engine.tenders.rollback(owner, tender.id, 1).await.unwrap_err();
    assert!(matches!(err, AppError::VersionNotFound { version: 1, .. }));

    let err = app.engine.tenders.rollback(owner, tender.id, 0).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));

    assert_eq!(app.tender(tender.id).await.version, 1);
    assert!(app.tender_history(tender.id).await.is_empty());
}

#[tokio::test]
async fn test_rollback_checks_caller_before_version() {
    let app = setup_test_app();
    let org = app.organization("acme", 1).await;
    let rival = app.organization("rival", 1).await;
    let bidder = app.user("bidder").await;
    let tender = app.published_tender(&org).await;
    let bid = app.create_bid(&tender, &bidder, "User").await;

    let err = app.engine.tenders.rollback("ghost", tender.id, 0).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated(_)));
    let err = app
        .engine
        .tenders
        .rollback(&org.owner().username, Uuid::new_v4(), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = app
        .engine
        .tenders
        .rollback(&rival.owner().username, tender.id, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = app.engine.bids.rollback("ghost", bid.id, 0).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated(_)));
    let err = app
        .engine
        .bids
        .rollback(&bidder.username, Uuid::new_v4(), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = app
        .engine
        .bids
        .rollback(&rival.owner().username, bid.id, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = app.engine.bids.rollback(&bidder.username, bid.id, 0).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_bid_rollback() {
    let app = setup_test_app();
    let org = app.organization("acme", 1).await;
    let bidder = app.user("bidder").await;
    let tender = app.published_tender(&org).await;
    let bid = app.published_bid(&tender, &bidder).await;
    assert_eq!(bid.version, 2);

    app.engine
        .bids
        .set_status(&bidder.username, bid.id, "Canceled")
        .await
        .unwrap();
    let restored = app
        .engine
        .bids
        .rollback(&bidder.username, bid.id, 2)
        .await
        .unwrap();
    assert_eq!(restored.status, BidStatus::Published);
    assert_eq!(restored.version, 4);
    assert_eq!(app.bid_history(bid.id).await.len(), 3);
}

#[tokio::test]
async fn test_empty_patch_is_a_no_op() {
    let app = setup_test_app();
    let org = app.organization("acme", 1).await;
    let bidder = app.user("bidder").await;
    let tender = app.published_tender(&org).await;
    let bid = app.create_bid(&tender, &bidder, "User").await;

    let unchanged = app
        .engine
        .bids
        .edit(&bidder.username, bid.id, BidPatch::default())
        .await
        .unwrap();
    assert_eq!(unchanged.version, 1);
    assert!(app.bid_history(bid.id).await.is_empty());
}

#[tokio::test]
async fn test_invalid_patch_values_leave_entity_untouched() {
    let app = setup_test_app();
    let org = app.organization("acme", 1).await;
    let owner = &org.owner().username;
    let tender = app.create_tender(&org, "Bridge", "Construction").await;

    let err = app
        .engine
        .tenders
        .edit(
            owner,
            tender.id,
            TenderPatch {
                name: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));

    let err = app
        .engine
        .tenders
        .edit(
            owner,
            tender.id,
            TenderPatch {
                service_type: Some("Catering".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));

    assert_eq!(app.tender(tender.id).await.version, 1);
}

#[tokio::test]
async fn test_storage_failure_is_all_or_nothing() {
    let app = setup_test_app();
    let org = app.organization("acme", 1).await;
    let owner = &org.owner().username;
    let tender = app.create_tender(&org, "Bridge", "Construction").await;

    app.store.set_fail_writes(true).await;
    let err = app
        .engine
        .tenders
        .set_status(owner, tender.id, "Published")
        .await
        .unwrap_err();
    assert!(err.is_storage_failure());

    app.store.set_fail_writes(false).await;
    let current = app.tender(tender.id).await;
    assert_eq!(current.version, 1);
    assert_eq!(current.status, TenderStatus::Created);
    assert!(app.tender_history(tender.id).await.is_empty());
}
