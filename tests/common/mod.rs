#![allow(dead_code)]

use auction_marketplace::auction::model::{Amount, AuctionDraft, AuctionId};
use auction_marketplace::clock::ManualClock;
use auction_marketplace::message_broker::MemoryPublisher;
use auction_marketplace::store::MemoryStore;
use auction_marketplace::{AccountService, AuctionService, RequestContext};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

pub const SELLER: i64 = 1;
pub const BIDDER: i64 = 2;
pub const RIVAL: i64 = 3;
pub const ADMIN: i64 = 99;

/// 트레이싱 초기화 (여러 테스트에서 호출해도 한 번만 설치)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_target(false)
        .with_test_writer()
        .try_init();
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// 인메모리 저장소 + 수동 시계 테스트 환경
pub struct TestEnv {
    pub service: Arc<AuctionService>,
    pub accounts: AccountService,
    pub clock: ManualClock,
    pub publisher: Arc<MemoryPublisher>,
}

pub fn setup() -> TestEnv {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let clock = ManualClock::new(start_time());
    let publisher = Arc::new(MemoryPublisher::new());

    let service = AuctionService::new(store.clone())
        .with_clock(Arc::new(clock.clone()))
        .with_publisher(publisher.clone());

    TestEnv {
        service: Arc::new(service),
        accounts: AccountService::new(store),
        clock,
        publisher,
    }
}

pub fn draft(title: &str, starting_price: Amount, buy_now_price: Amount, category: &str) -> AuctionDraft {
    AuctionDraft {
        title: title.to_string(),
        description: format!("{} 설명", title),
        starting_price,
        buy_now_price,
        end_time: start_time() + Duration::days(7),
        category: category.to_string(),
    }
}

impl TestEnv {
    /// SELLER 명의로 경매 생성
    pub async fn create(&self, title: &str, starting_price: Amount, buy_now_price: Amount) -> AuctionId {
        self.service
            .create_auction(
                draft(title, starting_price, buy_now_price, "Collectibles"),
                &RequestContext::user(SELLER),
            )
            .await
            .expect("경매 생성 실패")
    }
}
