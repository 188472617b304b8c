use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type AuctionId = i64;
pub type BidId = i64;
pub type UserId = i64;
/// 금액 (최소 화폐 단위)
pub type Amount = i64;

// region:    --- Auction Status
/// 경매 상태
/// ACTIVE 에서 FINISHED 또는 REMOVED 로만 전이되며, 종료 상태에서 벗어나는 전이는 없다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuctionStatus {
    Active,
    Finished,
    Removed,
}

impl AuctionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuctionStatus::Active => "ACTIVE",
            AuctionStatus::Finished => "FINISHED",
            AuctionStatus::Removed => "REMOVED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, AuctionStatus::Active)
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuctionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(AuctionStatus::Active),
            "FINISHED" => Ok(AuctionStatus::Finished),
            "REMOVED" => Ok(AuctionStatus::Removed),
            other => Err(format!("알 수 없는 경매 상태: {}", other)),
        }
    }
}
// endregion: --- Auction Status

// region:    --- Auction
/// 경매 모델
/// 입찰 목록은 별도 테이블에 저장되며, 조회 시 금액 내림차순으로 채워진다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auction {
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
    pub bids: Vec<Bid>,
}

impl Auction {
    /// 최고 입찰
    pub fn highest_bid(&self) -> Option<&Bid> {
        self.bids.iter().max_by_key(|bid| bid.amount)
    }

    /// 현재 가격 (입찰이 없으면 시작가)
    pub fn current_bid(&self) -> Amount {
        self.highest_bid()
            .map(|bid| bid.amount)
            .unwrap_or(self.starting_price)
    }

    pub fn has_bids(&self) -> bool {
        !self.bids.is_empty()
    }

    /// 입찰 가능 여부 (ACTIVE 이면서 종료 시간 전)
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.status == AuctionStatus::Active && self.end_time > now
    }
}
// endregion: --- Auction

// region:    --- Bid
/// 입찰 모델
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: BidId,
    pub auction_id: AuctionId,
    pub bidder_id: UserId,
    pub amount: Amount,
    pub bid_time: DateTime<Utc>,
}

/// 저장 전 입찰 (id 미할당)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBid {
    pub bidder_id: UserId,
    pub amount: Amount,
    pub bid_time: DateTime<Utc>,
}
// endregion: --- Bid

// region:    --- Commands Input
/// 경매 생성 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionDraft {
    pub title: String,
    pub description: String,
    pub starting_price: Amount,
    pub buy_now_price: Amount,
    pub end_time: DateTime<Utc>,
    pub category: String,
}

/// 경매 수정 요청 (None 인 필드는 변경하지 않음)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub buy_now_price: Option<Amount>,
    pub category: Option<String>,
    pub end_time: Option<DateTime<Utc>>,
}

impl AuctionPatch {
    pub fn is_empty(&self) -> bool {
        self == &AuctionPatch::default()
    }
}

/// 저장소에 새로 기록할 경매
#[derive(Debug, Clone)]
pub struct NewAuction {
    pub title: String,
    pub description: String,
    pub starting_price: Amount,
    pub buy_now_price: Amount,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub seller_id: UserId,
    pub category: String,
}
// endregion: --- Commands Input
