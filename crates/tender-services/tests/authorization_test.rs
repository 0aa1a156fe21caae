mod helpers;

use helpers::setup_test_app;
use tender_core::models::{AuthorType, BidPatch, BidStatus, TenderStatus};
use tender_core::AppError;

#[tokio::test]
async fn test_organization_bid_is_shared_with_co_members() {
    let app = setup_test_app();
    let buyer = app.organization("buyer", 1).await;
    let supplier = app.organization("supplier", 2).await;
    let rival = app.organization("rival", 1).await;
    let tender = app.published_tender(&buyer).await;

    let author = &supplier.members[0];
    let colleague = &supplier.members[1];
    let bid = app.create_bid(&tender, author, "Organization").await;
    assert_eq!(bid.author_type, AuthorType::Organization);
    assert_eq!(bid.author_id, author.id);

    let published = app
        .engine
        .bids
        .set_status(&colleague.username, bid.id, "Published")
        .await
        .unwrap();
    assert_eq!(published.status, BidStatus::Published);
    assert_eq!(
        app.engine
            .bids
            .get_status(&colleague.username, bid.id)
            .await
            .unwrap(),
        BidStatus::Published
    );

    let outsider = &rival.owner().username;
    let err = app
        .engine
        .bids
        .edit(
            outsider,
            bid.id,
            BidPatch {
                name: Some("Hijacked".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = app.engine.bids.get_status(outsider, bid.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    let err = app.engine.bids.rollback(outsider, bid.id, 1).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_user_bid_is_private_to_author() {
    let app = setup_test_app();
    let buyer = app.organization("buyer", 1).await;
    let supplier = app.organization("supplier", 2).await;
    let tender = app.published_tender(&buyer).await;
    let bid = app.create_bid(&tender, &supplier.members[0], "User").await;

    let err = app
        .engine
        .bids
        .set_status(&supplier.members[1].username, bid.id, "Published")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    assert_eq!(app.bid(bid.id).await.version, 1);
}

#[tokio::test]
async fn test_tender_actions_require_membership() {
    let app = setup_test_app();
    let buyer = app.organization("buyer", 2).await;
    let rival = app.organization("rival", 1).await;
    let tender = app.create_tender(&buyer, "Bridge", "Construction").await;
    let outsider = &rival.owner().username;

    let err = app.engine.tenders.get_status(outsider, tender.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    let err = app
        .engine
        .tenders
        .set_status(outsider, tender.id, "Published")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    let err = app.engine.tenders.rollback(outsider, tender.id, 1).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // Any responsible member may act, not only the creator
    let status = app
        .engine
        .tenders
        .get_status(&buyer.members[1].username, tender.id)
        .await
        .unwrap();
    assert_eq!(status, TenderStatus::Created);
}

#[tokio::test]
async fn test_identity_is_checked_before_existence_and_permission() {
    let app = setup_test_app();
    let buyer = app.organization("buyer", 1).await;
    let rival = app.organization("rival", 1).await;
    let tender = app.create_tender(&buyer, "Bridge", "Construction").await;

    let err = app
        .engine
        .tenders
        .set_status("ghost", uuid::Uuid::new_v4(), "Bogus")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated(_)));

    let err = app
        .engine
        .tenders
        .set_status(&rival.owner().username, uuid::Uuid::new_v4(), "Bogus")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = app
        .engine
        .tenders
        .set_status(&rival.owner().username, tender.id, "Bogus")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = app
        .engine
        .tenders
        .set_status(&buyer.owner().username, tender.id, "Bogus")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}
