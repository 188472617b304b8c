mod common;

use auction_marketplace::accounts::Registration;
use auction_marketplace::auction::model::{AuctionDraft, AuctionPatch, AuctionStatus};
use auction_marketplace::query::handlers::{AuctionFilter, AuctionSort, CATEGORIES};
use auction_marketplace::seed::initialize_sample_data;
use auction_marketplace::store::MemoryStore;
use auction_marketplace::{AuctionError, RequestContext, Role};
use chrono::Duration;
use common::{draft, setup, start_time, ADMIN, BIDDER, RIVAL, SELLER};
use std::sync::Arc;

// region:    --- Bidding

/// 시작가 100, 즉시 구매가 150 경매의 입찰 흐름
#[tokio::test]
async fn test_bid_sequence_then_buy_now() {
    let env = setup();
    let id = env.create("Rare Comic Book", 100, 150).await;
    let bidder = RequestContext::user(BIDDER);
    let rival = RequestContext::user(RIVAL);

    match env.service.place_bid(id, 90, &bidder).await {
        Err(AuctionError::BidTooLow { amount, minimum }) => {
            assert_eq!(amount, 90);
            assert_eq!(minimum, 100);
        }
        other => panic!("시작가 미만 입찰이 통과됨: {:?}", other),
    }

    let first = env.service.place_bid(id, 100, &bidder).await.unwrap();
    assert_eq!(first.amount, 100);
    assert_eq!(first.bid_time, start_time());

    assert!(matches!(
        env.service.place_bid(id, 100, &rival).await,
        Err(AuctionError::BidTooLow { minimum: 101, .. })
    ));

    env.service.place_bid(id, 120, &rival).await.unwrap();
    assert_eq!(env.service.suggested_bid(id).await.unwrap(), 121);
    assert_eq!(env.service.highest_bid(id).await.unwrap(), Some(120));

    env.clock.advance(Duration::minutes(5));
    let auction = env.service.buy_now(id, &bidder).await.unwrap();

    assert_eq!(auction.status, AuctionStatus::Finished);
    assert_eq!(auction.winner_id, Some(BIDDER));
    assert_eq!(auction.end_time, start_time() + Duration::minutes(5));
    let amounts: Vec<_> = auction.bids.iter().map(|bid| bid.amount).collect();
    assert_eq!(amounts, vec![150, 120, 100]);
    assert_eq!(auction.bids[0].bidder_id, BIDDER);
}

#[tokio::test]
async fn test_suggested_bid_without_bids() {
    let env = setup();
    let id = env.create("Vintage Car", 3_500_000, 4_000_000).await;

    assert_eq!(env.service.suggested_bid(id).await.unwrap(), 3_500_001);
    assert_eq!(env.service.highest_bid(id).await.unwrap(), None);
    // 시작가와 같은 첫 입찰은 허용
    env.service
        .place_bid(id, 3_500_000, &RequestContext::user(BIDDER))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_bid_on_closed_auctions_is_rejected() {
    let env = setup();
    let bidder = RequestContext::user(BIDDER);

    let finished = env.create("Antique Vase", 5_000, 7_000).await;
    env.service.buy_now(finished, &bidder).await.unwrap();

    let removed = env.create("Diamond Necklace", 15_000, 18_000).await;
    env.service
        .remove_auction(removed, &RequestContext::user(SELLER))
        .await
        .unwrap();

    for id in [finished, removed] {
        assert!(matches!(
            env.service.place_bid(id, 1_000_000, &bidder).await,
            Err(AuctionError::NotActive(got)) if got == id
        ));
    }
}

#[tokio::test]
async fn test_bid_after_end_time_is_rejected_before_sweep() {
    let env = setup();
    let id = env.create("Luxury Apartment", 500_000, 550_000).await;
    env.clock.advance(Duration::days(7));

    assert!(matches!(
        env.service
            .place_bid(id, 600_000, &RequestContext::user(BIDDER))
            .await,
        Err(AuctionError::NotActive(_))
    ));
    assert!(matches!(
        env.service.buy_now(id, &RequestContext::user(BIDDER)).await,
        Err(AuctionError::NotActive(_))
    ));
    // 스윕 전이므로 상태는 그대로
    let auction = env.service.get_auction(id).await.unwrap();
    assert_eq!(auction.status, AuctionStatus::Active);
    assert!(auction.bids.is_empty());
}

/// 최대 금액 입찰 이후에도 최소 입찰가 계산이 넘치지 않아야 한다
#[tokio::test]
async fn test_bid_after_max_amount_is_rejected() {
    let env = setup();
    let id = env.create("Rare Comic Book", 100, 150).await;

    env.service
        .place_bid(id, i64::MAX, &RequestContext::user(BIDDER))
        .await
        .unwrap();

    for amount in [200, i64::MAX] {
        match env.service.place_bid(id, amount, &RequestContext::user(RIVAL)).await {
            Err(AuctionError::BidTooLow { minimum, .. }) => assert_eq!(minimum, i64::MAX),
            other => panic!("최고가 이하 입찰이 통과됨: {:?}", other),
        }
    }

    assert_eq!(env.service.suggested_bid(id).await.unwrap(), i64::MAX);
    let auction = env.service.get_auction(id).await.unwrap();
    assert_eq!(auction.bids.len(), 1);
    assert_eq!(auction.current_bid(), i64::MAX);
}

#[tokio::test]
async fn test_second_buy_now_fails() {
    let env = setup();
    let id = env.create("Designer Handbag", 2_000, 2_500).await;

    env.service
        .buy_now(id, &RequestContext::user(BIDDER))
        .await
        .unwrap();
    assert!(matches!(
        env.service.buy_now(id, &RequestContext::user(RIVAL)).await,
        Err(AuctionError::NotActive(_))
    ));

    let auction = env.service.get_auction(id).await.unwrap();
    assert_eq!(auction.winner_id, Some(BIDDER));
    assert_eq!(auction.bids.len(), 1);
}

#[tokio::test]
async fn test_unknown_auction_is_not_found() {
    let env = setup();
    let bidder = RequestContext::user(BIDDER);

    assert!(matches!(
        env.service.get_auction(404).await,
        Err(AuctionError::NotFound { id: 404, .. })
    ));
    assert!(matches!(
        env.service.place_bid(404, 100, &bidder).await,
        Err(AuctionError::NotFound { .. })
    ));
    assert!(matches!(
        env.service.suggested_bid(404).await,
        Err(AuctionError::NotFound { .. })
    ));
}

// endregion: --- Bidding

// region:    --- Management

#[tokio::test]
async fn test_create_auction_reports_every_violation() {
    let env = setup();
    let invalid = AuctionDraft {
        title: String::new(),
        description: "  ".to_string(),
        starting_price: 0,
        buy_now_price: -5,
        end_time: start_time() - Duration::hours(1),
        category: String::new(),
    };

    match env
        .service
        .create_auction(invalid, &RequestContext::user(SELLER))
        .await
    {
        Err(AuctionError::Validation(errors)) => {
            for field in [
                "title",
                "description",
                "startingPrice",
                "buyNowPrice",
                "endTime",
                "category",
            ] {
                assert!(errors.has_field(field), "{} 누락", field);
            }
        }
        other => panic!("검증 실패가 아님: {:?}", other),
    }

    let mut cheap = draft("Vintage Car", 100, 100, "Automotive");
    cheap.end_time = start_time();
    match env
        .service
        .create_auction(cheap, &RequestContext::user(SELLER))
        .await
    {
        Err(AuctionError::Validation(errors)) => {
            assert_eq!(errors.errors().len(), 2);
            assert!(errors.has_field("buyNowPrice"));
            assert!(errors.has_field("endTime"));
        }
        other => panic!("검증 실패가 아님: {:?}", other),
    }
}

#[tokio::test]
async fn test_created_auction_starts_active() {
    let env = setup();
    let id = env.create("Antique Vase", 5_000, 7_000).await;
    let auction = env.service.get_auction(id).await.unwrap();

    assert_eq!(auction.status, AuctionStatus::Active);
    assert_eq!(auction.seller_id, SELLER);
    assert_eq!(auction.start_time, start_time());
    assert_eq!(auction.version, 0);
    assert_eq!(auction.current_bid(), 5_000);
    assert!(auction.winner_id.is_none());
}

#[tokio::test]
async fn test_remove_with_bids_requires_admin() {
    let env = setup();
    let id = env.create("Rare Comic Book", 50_000, 60_000).await;
    env.service
        .place_bid(id, 50_000, &RequestContext::user(BIDDER))
        .await
        .unwrap();

    assert!(matches!(
        env.service
            .remove_auction(id, &RequestContext::user(SELLER))
            .await,
        Err(AuctionError::HasBids(_))
    ));

    env.service
        .remove_auction(id, &RequestContext::admin(ADMIN))
        .await
        .unwrap();
    let auction = env.service.get_auction(id).await.unwrap();
    assert_eq!(auction.status, AuctionStatus::Removed);
    assert_eq!(auction.bids.len(), 1);

    // 종료 상태에서 다시 삭제할 수 없음
    assert!(matches!(
        env.service
            .remove_auction(id, &RequestContext::admin(ADMIN))
            .await,
        Err(AuctionError::NotActive(_))
    ));
}

#[tokio::test]
async fn test_only_owner_or_admin_may_modify() {
    let env = setup();
    let id = env.create("Diamond Necklace", 15_000, 18_000).await;
    let stranger = RequestContext::user(RIVAL);
    let patch = AuctionPatch {
        title: Some("Fake Necklace".to_string()),
        ..Default::default()
    };

    assert!(matches!(
        env.service.update_auction(id, patch.clone(), &stranger).await,
        Err(AuctionError::Permission(_))
    ));
    assert!(matches!(
        env.service.remove_auction(id, &stranger).await,
        Err(AuctionError::Permission(_))
    ));

    let updated = env
        .service
        .update_auction(id, patch, &RequestContext::admin(ADMIN))
        .await
        .unwrap();
    assert_eq!(updated.title, "Fake Necklace");
}

#[tokio::test]
async fn test_update_auction_revalidates_changed_fields() {
    let env = setup();
    let id = env.create("Vintage Car", 35_000, 40_000).await;
    let seller = RequestContext::user(SELLER);

    let invalid = AuctionPatch {
        buy_now_price: Some(30_000),
        end_time: Some(start_time() - Duration::days(1)),
        ..Default::default()
    };
    match env.service.update_auction(id, invalid, &seller).await {
        Err(AuctionError::Validation(errors)) => {
            assert!(errors.has_field("buyNowPrice"));
            assert!(errors.has_field("endTime"));
        }
        other => panic!("검증 실패가 아님: {:?}", other),
    }

    let patch = AuctionPatch {
        description: Some("1965 Ford Mustang, restored".to_string()),
        buy_now_price: Some(45_000),
        category: Some("Automotive".to_string()),
        end_time: Some(start_time() + Duration::days(10)),
        ..Default::default()
    };
    let updated = env.service.update_auction(id, patch, &seller).await.unwrap();
    assert_eq!(updated.title, "Vintage Car");
    assert_eq!(updated.buy_now_price, 45_000);
    assert_eq!(updated.end_time, start_time() + Duration::days(10));
    assert_eq!(updated.version, 1);

    env.service
        .buy_now(id, &RequestContext::user(BIDDER))
        .await
        .unwrap();
    let late = AuctionPatch {
        title: Some("Too late".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        env.service.update_auction(id, late, &seller).await,
        Err(AuctionError::NotActive(_))
    ));
}

/// 변경 필드가 없는 수정은 커밋하지 않는다
#[tokio::test]
async fn test_empty_patch_leaves_auction_untouched() {
    let env = setup();
    let id = env.create("Antique Vase", 5_000, 7_000).await;

    let auction = env
        .service
        .update_auction(id, AuctionPatch::default(), &RequestContext::user(SELLER))
        .await
        .unwrap();
    assert_eq!(auction.version, 0);
    assert_eq!(auction.title, "Antique Vase");

    // 빈 수정이어도 권한 검사는 수행
    assert!(matches!(
        env.service
            .update_auction(id, AuctionPatch::default(), &RequestContext::user(RIVAL))
            .await,
        Err(AuctionError::Permission(_))
    ));

    let types: Vec<_> = env
        .publisher
        .events()
        .await
        .iter()
        .map(|event| event.event_type())
        .collect();
    assert_eq!(types, vec!["AuctionCreated"]);
}

#[tokio::test]
async fn test_committed_transitions_publish_events() {
    let env = setup();
    let id = env.create("Antique Vase", 5_000, 7_000).await;
    env.service
        .place_bid(id, 5_500, &RequestContext::user(BIDDER))
        .await
        .unwrap();
    let _ = env
        .service
        .place_bid(id, 10, &RequestContext::user(RIVAL))
        .await;
    env.service
        .buy_now(id, &RequestContext::user(RIVAL))
        .await
        .unwrap();

    let types: Vec<_> = env
        .publisher
        .events()
        .await
        .iter()
        .map(|event| event.event_type())
        .collect();
    assert_eq!(types, vec!["AuctionCreated", "BidPlaced", "BuyNowExecuted"]);
}

// endregion: --- Management

// region:    --- Queries

#[tokio::test]
async fn test_list_auctions_filters_and_sorts() {
    let env = setup();
    let seller = RequestContext::user(SELLER);
    let bidder = RequestContext::user(BIDDER);

    let apartment = env
        .service
        .create_auction(draft("Luxury Apartment", 500_000, 550_000, "Real Estate"), &seller)
        .await
        .unwrap();
    let mut car_draft = draft("Vintage Car", 35_000, 40_000, "Automotive");
    car_draft.end_time = start_time() + Duration::days(2);
    let car = env.service.create_auction(car_draft, &seller).await.unwrap();
    let toy_car = env
        .service
        .create_auction(draft("Toy Car", 10, 20, "Collectibles"), &seller)
        .await
        .unwrap();
    let sold = env
        .service
        .create_auction(draft("Car Poster", 5, 9, "Collectibles"), &seller)
        .await
        .unwrap();
    env.service.buy_now(sold, &bidder).await.unwrap();

    env.service.place_bid(toy_car, 15, &bidder).await.unwrap();
    env.service.place_bid(toy_car, 16, &RequestContext::user(RIVAL)).await.unwrap();
    env.service.place_bid(car, 36_000, &bidder).await.unwrap();

    let ids = |auctions: Vec<auction_marketplace::auction::model::Auction>| {
        auctions.iter().map(|a| a.id).collect::<Vec<_>>()
    };

    // 기본: ACTIVE 만, id 순
    let all = env.service.list_auctions(&AuctionFilter::default()).await.unwrap();
    assert_eq!(ids(all), vec![apartment, car, toy_car]);

    let search = AuctionFilter {
        search: Some("CAR".to_string()),
        category: Some("All".to_string()),
        ..Default::default()
    };
    assert_eq!(ids(env.service.list_auctions(&search).await.unwrap()), vec![car, toy_car]);

    let narrowed = AuctionFilter {
        search: Some("car".to_string()),
        category: Some("Collectibles".to_string()),
        ..Default::default()
    };
    assert_eq!(ids(env.service.list_auctions(&narrowed).await.unwrap()), vec![toy_car]);

    let by_price = AuctionFilter {
        sort: Some(AuctionSort::PriceDesc),
        ..Default::default()
    };
    assert_eq!(
        ids(env.service.list_auctions(&by_price).await.unwrap()),
        vec![apartment, car, toy_car]
    );

    let by_time = AuctionFilter {
        sort: Some(AuctionSort::TimeAsc),
        ..Default::default()
    };
    assert_eq!(
        ids(env.service.list_auctions(&by_time).await.unwrap()),
        vec![car, apartment, toy_car]
    );

    let popular = AuctionFilter {
        sort: Some(AuctionSort::Popularity),
        ..Default::default()
    };
    assert_eq!(
        ids(env.service.list_auctions(&popular).await.unwrap()),
        vec![toy_car, car, apartment]
    );

    let finished = AuctionFilter {
        status: Some(AuctionStatus::Finished),
        ..Default::default()
    };
    assert_eq!(ids(env.service.list_auctions(&finished).await.unwrap()), vec![sold]);
}

#[tokio::test]
async fn test_user_projections() {
    let env = setup();
    let bidder = RequestContext::user(BIDDER);

    let watched = env.create("Rare Comic Book", 100, 200).await;
    let bought = env.create("Antique Vase", 100, 200).await;
    let removed = env.create("Toy Car", 100, 200).await;
    let untouched = env.create("Designer Handbag", 100, 200).await;

    env.service.place_bid(watched, 100, &bidder).await.unwrap();
    env.service.place_bid(bought, 100, &bidder).await.unwrap();
    env.service.buy_now(bought, &bidder).await.unwrap();
    env.service
        .remove_auction(removed, &RequestContext::admin(ADMIN))
        .await
        .unwrap();

    let with_bids = env
        .service
        .auctions_with_user_bids(BIDDER, None, None)
        .await
        .unwrap();
    assert_eq!(with_bids.iter().map(|a| a.id).collect::<Vec<_>>(), vec![watched]);

    let searched = env
        .service
        .auctions_with_user_bids(BIDDER, None, Some("vase".to_string()))
        .await
        .unwrap();
    assert!(searched.is_empty());

    let purchases = env.service.user_purchases(BIDDER).await.unwrap();
    assert_eq!(purchases.iter().map(|a| a.id).collect::<Vec<_>>(), vec![bought]);
    assert!(env.service.user_purchases(RIVAL).await.unwrap().is_empty());

    let owned = env.service.auctions_by_seller(SELLER).await.unwrap();
    assert_eq!(owned.len(), 4);
    assert!(owned.iter().any(|a| a.id == untouched));

    let finished = env.service.finished_auctions().await.unwrap();
    assert_eq!(finished.iter().map(|a| a.id).collect::<Vec<_>>(), vec![bought]);

    let archived = env.service.archived_auctions().await.unwrap();
    assert_eq!(
        archived.iter().map(|a| a.id).collect::<Vec<_>>(),
        vec![bought, removed]
    );

    let bids = env.service.bids_for_auction(bought).await.unwrap();
    assert_eq!(bids.iter().map(|b| b.amount).collect::<Vec<_>>(), vec![200, 100]);
}

// endregion: --- Queries

// region:    --- Accounts & Seed

fn registration(login: &str, password: &str) -> Registration {
    Registration {
        name: "Janusz".to_string(),
        surname: "Kowalski".to_string(),
        login: login.to_string(),
        password: password.to_string(),
        role: Role::User,
    }
}

#[tokio::test]
async fn test_register_and_authenticate() {
    let env = setup();

    let user = env
        .accounts
        .register(registration("janusz", "janusz123"))
        .await
        .unwrap();
    assert_ne!(user.password_hash, "janusz123");

    let ctx = env.accounts.authenticate("janusz", "janusz123").await.unwrap();
    assert_eq!(ctx, RequestContext::user(user.id));
    assert_eq!(env.accounts.get_user(user.id).await.unwrap().login, "janusz");

    assert!(matches!(
        env.accounts.authenticate("janusz", "wrong-password").await,
        Err(AuctionError::InvalidCredentials)
    ));
    assert!(matches!(
        env.accounts.authenticate("nobody", "janusz123").await,
        Err(AuctionError::InvalidCredentials)
    ));
    assert!(matches!(
        env.accounts.register(registration("janusz", "other123")).await,
        Err(AuctionError::LoginTaken)
    ));
    assert!(matches!(
        env.accounts.register(registration("jan", "abc")).await,
        Err(AuctionError::Validation(_))
    ));
}

#[tokio::test]
async fn test_sample_data_seeding() {
    common::init_tracing();
    let store = Arc::new(MemoryStore::new());
    let service = auction_marketplace::AuctionService::new(store.clone());

    assert_eq!(initialize_sample_data(store.as_ref(), &service).await.unwrap(), 6);
    assert_eq!(initialize_sample_data(store.as_ref(), &service).await.unwrap(), 0);

    let auctions = service.list_auctions(&AuctionFilter::default()).await.unwrap();
    let mut categories: Vec<_> = auctions.iter().map(|a| a.category.as_str()).collect();
    categories.sort_unstable();
    let mut expected = CATEGORIES.to_vec();
    expected.sort_unstable();
    assert_eq!(categories, expected);

    let accounts = auction_marketplace::AccountService::new(store);
    let admin = accounts.authenticate("admin", "admin").await.unwrap();
    assert!(admin.is_admin());
    let janusz = accounts.authenticate("janusz", "janusz123").await.unwrap();
    assert_eq!(janusz.role, Role::User);
}

// endregion: --- Accounts & Seed
