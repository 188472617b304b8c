/// 경매 저장소
/// 경매, 입찰, 사용자를 id 로 키잉된 독립 테이블에 보관한다.
/// 모든 쓰기는 버전 비교 후 갱신(commit) 한 번으로 원자적으로 적용된다.
// region:    --- Imports
use crate::accounts::{NewUser, User};
use crate::auction::model::{
    Amount, Auction, AuctionId, AuctionPatch, AuctionStatus, Bid, NewAuction, NewBid, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

// endregion: --- Imports

// region:    --- Store Error
#[derive(Debug, Error)]
pub enum StoreError {
    /// 읽은 이후 다른 쓰기가 먼저 커밋됨
    #[error("버전 충돌: 경매 {0}")]
    VersionConflict(AuctionId),

    #[error("레코드를 찾을 수 없습니다: {0}")]
    NotFound(i64),

    #[error("이미 사용 중인 로그인: {0}")]
    LoginTaken(String),

    #[error("데이터베이스 오류: {0}")]
    Database(#[from] sqlx::Error),

    #[error("저장된 값을 읽을 수 없습니다: {0}")]
    Corrupt(String),
}
// endregion: --- Store Error

// region:    --- Records
/// 입찰 목록을 제외한 경매 레코드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionRecord {
    pub id: AuctionId,
    pub title: String,
    pub description: String,
    pub starting_price: Amount,
    pub buy_now_price: Amount,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub seller_id: UserId,
    pub category: String,
    pub status: AuctionStatus,
    pub winner_id: Option<UserId>,
    pub version: i64,
}

impl AuctionRecord {
    pub fn new(id: AuctionId, auction: NewAuction) -> Self {
        Self {
            id,
            title: auction.title,
            description: auction.description,
            starting_price: auction.starting_price,
            buy_now_price: auction.buy_now_price,
            start_time: auction.start_time,
            end_time: auction.end_time,
            seller_id: auction.seller_id,
            category: auction.category,
            status: AuctionStatus::Active,
            winner_id: None,
            version: 0,
        }
    }

    /// 변경 사항 적용 및 버전 증가
    pub fn apply(&mut self, change: &AuctionChange) {
        if let Some(status) = change.status {
            self.status = status;
        }
        if let Some(winner_id) = change.winner_id {
            self.winner_id = Some(winner_id);
        }
        if let Some(end_time) = change.end_time {
            self.end_time = end_time;
        }
        if let Some(title) = &change.title {
            self.title = title.clone();
        }
        if let Some(description) = &change.description {
            self.description = description.clone();
        }
        if let Some(buy_now_price) = change.buy_now_price {
            self.buy_now_price = buy_now_price;
        }
        if let Some(category) = &change.category {
            self.category = category.clone();
        }
        self.version += 1;
    }

    pub fn into_auction(self, bids: Vec<Bid>) -> Auction {
        Auction {
            id: self.id,
            title: self.title,
            description: self.description,
            starting_price: self.starting_price,
            buy_now_price: self.buy_now_price,
            start_time: self.start_time,
            end_time: self.end_time,
            seller_id: self.seller_id,
            category: self.category,
            status: self.status,
            winner_id: self.winner_id,
            version: self.version,
            bids,
        }
    }
}

/// 입찰 정렬: 금액 내림차순, 같은 금액은 먼저 들어온 입찰 우선
pub fn sort_bids(bids: &mut [Bid]) {
    bids.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then(a.bid_time.cmp(&b.bid_time))
            .then(a.id.cmp(&b.id))
    });
}
// endregion: --- Records

// region:    --- Auction Change
/// 경매 하나에 원자적으로 적용되는 변경
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuctionChange {
    pub status: Option<AuctionStatus>,
    pub winner_id: Option<UserId>,
    pub end_time: Option<DateTime<Utc>>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub buy_now_price: Option<Amount>,
    pub category: Option<String>,
    pub bid: Option<NewBid>,
}

impl AuctionChange {
    pub fn append_bid(bid: NewBid) -> Self {
        Self {
            bid: Some(bid),
            ..Default::default()
        }
    }

    pub fn edit(patch: AuctionPatch) -> Self {
        Self {
            title: patch.title,
            description: patch.description,
            buy_now_price: patch.buy_now_price,
            category: patch.category,
            end_time: patch.end_time,
            ..Default::default()
        }
    }

    pub fn finish(winner_id: Option<UserId>) -> Self {
        Self {
            status: Some(AuctionStatus::Finished),
            winner_id,
            ..Default::default()
        }
    }

    pub fn remove() -> Self {
        Self {
            status: Some(AuctionStatus::Removed),
            ..Default::default()
        }
    }
}

/// 커밋 결과
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    pub auction: Auction,
    pub bid: Option<Bid>,
}
// endregion: --- Auction Change

// region:    --- Auction Query
/// 경매 목록 조회 조건 (비어 있는 조건은 무시)
#[derive(Debug, Clone, Default)]
pub struct AuctionQuery {
    pub statuses: Vec<AuctionStatus>,
    pub category: Option<String>,
    pub title_contains: Option<String>,
    pub seller_id: Option<UserId>,
    pub winner_id: Option<UserId>,
    pub bidder_id: Option<UserId>,
    pub ends_at_or_before: Option<DateTime<Utc>>,
}

impl AuctionQuery {
    pub fn with_statuses(statuses: &[AuctionStatus]) -> Self {
        Self {
            statuses: statuses.to_vec(),
            ..Default::default()
        }
    }

    pub fn matches(&self, auction: &Auction) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&auction.status) {
            return false;
        }
        if let Some(category) = &self.category {
            if &auction.category != category {
                return false;
            }
        }
        if let Some(search) = &self.title_contains {
            if !auction
                .title
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        if let Some(seller_id) = self.seller_id {
            if auction.seller_id != seller_id {
                return false;
            }
        }
        if let Some(winner_id) = self.winner_id {
            if auction.winner_id != Some(winner_id) {
                return false;
            }
        }
        if let Some(bidder_id) = self.bidder_id {
            if !auction.bids.iter().any(|bid| bid.bidder_id == bidder_id) {
                return false;
            }
        }
        if let Some(deadline) = self.ends_at_or_before {
            if auction.end_time > deadline {
                return false;
            }
        }
        true
    }
}
// endregion: --- Auction Query

// region:    --- Store Traits
#[async_trait]
pub trait AuctionStore: Send + Sync {
    /// 새 경매 저장 (ACTIVE, version 0)
    async fn insert_auction(&self, auction: NewAuction) -> Result<Auction, StoreError>;

    async fn find_auction(&self, id: AuctionId) -> Result<Option<Auction>, StoreError>;

    /// 조건에 맞는 경매를 id 오름차순으로 조회
    async fn find_auctions(&self, query: &AuctionQuery) -> Result<Vec<Auction>, StoreError>;

    /// 경매의 입찰 목록 (금액 내림차순)
    async fn bids_for_auction(&self, id: AuctionId) -> Result<Vec<Bid>, StoreError>;

    /// 현재 버전이 expected_version 과 같을 때만 변경을 적용한다.
    /// 다르면 StoreError::VersionConflict.
    async fn commit(
        &self,
        id: AuctionId,
        expected_version: i64,
        change: AuctionChange,
    ) -> Result<CommitOutcome, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// 로그인이 이미 있으면 StoreError::LoginTaken
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError>;
}
// endregion: --- Store Traits
