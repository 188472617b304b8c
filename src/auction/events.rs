use super::model::{Amount, AuctionId, AuctionStatus, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 커밋된 경매 상태 변화
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum AuctionEvent {
    // 경매 등록
    AuctionCreated {
        auction_id: AuctionId,
        seller_id: UserId,
        starting_price: Amount,
        end_time: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },
    // 입찰 이벤트
    BidPlaced {
        auction_id: AuctionId,
        bidder_id: UserId,
        bid_amount: Amount,
        timestamp: DateTime<Utc>,
    },
    // 즉시 구매 이벤트
    BuyNowExecuted {
        auction_id: AuctionId,
        buyer_id: UserId,
        price: Amount,
        timestamp: DateTime<Utc>,
    },
    // 만료로 인한 종료
    AuctionClosed {
        auction_id: AuctionId,
        winner_id: Option<UserId>,
        final_price: Option<Amount>,
        timestamp: DateTime<Utc>,
    },
    AuctionUpdated {
        auction_id: AuctionId,
        editor_id: UserId,
        timestamp: DateTime<Utc>,
    },
    AuctionRemoved {
        auction_id: AuctionId,
        removed_by: UserId,
        previous_status: AuctionStatus,
        timestamp: DateTime<Utc>,
    },
}

impl AuctionEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            AuctionEvent::AuctionCreated { .. } => "AuctionCreated",
            AuctionEvent::BidPlaced { .. } => "BidPlaced",
            AuctionEvent::BuyNowExecuted { .. } => "BuyNowExecuted",
            AuctionEvent::AuctionClosed { .. } => "AuctionClosed",
            AuctionEvent::AuctionUpdated { .. } => "AuctionUpdated",
            AuctionEvent::AuctionRemoved { .. } => "AuctionRemoved",
        }
    }

    pub fn auction_id(&self) -> AuctionId {
        match self {
            AuctionEvent::AuctionCreated { auction_id, .. }
            | AuctionEvent::BidPlaced { auction_id, .. }
            | AuctionEvent::BuyNowExecuted { auction_id, .. }
            | AuctionEvent::AuctionClosed { auction_id, .. }
            | AuctionEvent::AuctionUpdated { auction_id, .. }
            | AuctionEvent::AuctionRemoved { auction_id, .. } => *auction_id,
        }
    }
}
