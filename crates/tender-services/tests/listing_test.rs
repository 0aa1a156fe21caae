mod helpers;

use helpers::fixtures::page;
use helpers::setup_test_app;
use tender_core::models::{ServiceType, TenderStatus};
use tender_core::{AppError, PageParams};

#[tokio::test]
async fn test_pagination_bounds_fail_before_lookup() {
    let app = setup_test_app();
    let bad_pages = [page(0, 0), page(-1, 0), page(5, -1), page(101, 0)];

    for params in bad_pages {
        // Unknown users would be Unauthenticated if any lookup happened
        let err = app.engine.tenders.list_mine("ghost", params).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)), "{:?}", params);

        let err = app.engine.bids.list_mine("ghost", params).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));

        let err = app
            .engine
            .feedback
            .list("ghost", uuid::Uuid::new_v4(), "nobody", params)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));

        let err = app.engine.tenders.list_published(&[], params).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }
}

#[tokio::test]
async fn test_published_tenders_filtered_and_ordered() {
    let app = setup_test_app();
    let org = app.organization("acme", 1).await;
    let owner = &org.owner().username;

    for (name, service_type) in [
        ("Delta", "Delivery"),
        ("Alpha", "Construction"),
        ("Charlie", "Manufacture"),
        ("Bravo", "Construction"),
    ] {
        let tender = app.create_tender(&org, name, service_type).await;
        app.engine
            .tenders
            .set_status(owner, tender.id, "Published")
            .await
            .unwrap();
    }
    app.create_tender(&org, "Aardvark", "Construction").await;

    let all = app
        .engine
        .tenders
        .list_published(&[], PageParams::default())
        .await
        .unwrap();
    let names: Vec<&str> = all.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Bravo", "Charlie", "Delta"]);
    assert!(all.iter().all(|t| t.status == TenderStatus::Published));

    let filtered = app
        .engine
        .tenders
        .list_published(
            &["Construction".to_string(), "Delivery".to_string()],
            PageParams::default(),
        )
        .await
        .unwrap();
    let names: Vec<&str> = filtered.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Bravo", "Delta"]);
    assert!(filtered
        .iter()
        .all(|t| t.service_type != ServiceType::Manufacture));

    let second_page = app
        .engine
        .tenders
        .list_published(&[], page(2, 2))
        .await
        .unwrap();
    let names: Vec<&str> = second_page.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Charlie", "Delta"]);

    let err = app
        .engine
        .tenders
        .list_published(&["Catering".to_string()], PageParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_default_page_size_is_five() {
    let app = setup_test_app();
    let org = app.organization("acme", 1).await;
    for i in 0..7 {
        app.create_tender(&org, &format!("Tender {}", i), "Delivery").await;
    }

    let mine = app
        .engine
        .tenders
        .list_mine(&org.owner().username, PageParams::default())
        .await
        .unwrap();
    assert_eq!(mine.len(), 5);
    assert_eq!(mine[0].name, "Tender 0");
}

#[tokio::test]
async fn test_my_tenders_cover_every_membership() {
    let app = setup_test_app();
    let first = app.organization("first", 1).await;
    let second = app.organization("second", 1).await;
    let unrelated = app.organization("unrelated", 1).await;
    app.create_tender(&first, "From first", "Delivery").await;
    app.create_tender(&second, "From second", "Delivery").await;
    app.create_tender(&unrelated, "Unrelated", "Delivery").await;
    app.store
        .add_membership(second.id(), first.owner().id)
        .await;

    let mine = app
        .engine
        .tenders
        .list_mine(&first.owner().username, PageParams::default())
        .await
        .unwrap();
    let names: Vec<&str> = mine.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["From first", "From second"]);
}

#[tokio::test]
async fn test_tender_bids_only_published_and_only_for_members() {
    let app = setup_test_app();
    let buyer = app.organization("buyer", 1).await;
    let rival = app.organization("rival", 1).await;
    let bidder = app.user("bidder").await;
    let other_bidder = app.user("another").await;
    let tender = app.published_tender(&buyer).await;

    let published = app.published_bid(&tender, &bidder).await;
    app.create_bid(&tender, &other_bidder, "User").await;

    let bids = app
        .engine
        .bids
        .list_for_tender(&buyer.owner().username, tender.id, PageParams::default())
        .await
        .unwrap();
    assert_eq!(bids.len(), 1);
    assert_eq!(bids[0].id, published.id);

    let err = app
        .engine
        .bids
        .list_for_tender(&rival.owner().username, tender.id, PageParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = app
        .engine
        .bids
        .list_for_tender(&buyer.owner().username, uuid::Uuid::new_v4(), PageParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_my_bids() {
    let app = setup_test_app();
    let buyer = app.organization("buyer", 1).await;
    let bidder = app.user("bidder").await;
    let tender = app.published_tender(&buyer).await;
    let bid = app.create_bid(&tender, &bidder, "User").await;

    let mine = app
        .engine
        .bids
        .list_mine(&bidder.username, PageParams::default())
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, bid.id);

    let none = app
        .engine
        .bids
        .list_mine(&buyer.owner().username, PageParams::default())
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_duplicate_names_page_without_repeats() {
    let app = setup_test_app();
    let org = app.organization("acme", 1).await;
    for _ in 0..3 {
        app.published_tender(&org).await;
    }

    let mut seen = Vec::new();
    for offset in 0..3 {
        let tenders = app
            .engine
            .tenders
            .list_published(&[], page(1, offset))
            .await
            .unwrap();
        assert_eq!(tenders.len(), 1);
        seen.push(tenders[0].id);
    }
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 3);
}
