/// 입찰 관련 커맨드 처리
/// 1. 입찰
/// 2. 즉시 구매
/// 3. 추천 입찰가
// region:    --- Imports
use crate::auction::events::AuctionEvent;
use crate::auction::model::{Amount, Auction, AuctionId, Bid, NewBid, UserId};
use crate::auction::{load_auction, retry_on_conflict};
use crate::clock::Clock;
use crate::error::AuctionError;
use crate::store::{AuctionChange, AuctionStore, StoreError};
use serde::{Deserialize, Serialize};
use tracing::info;

// endregion: --- Imports

// region:    --- Commands
/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub auction_id: AuctionId,
    pub bidder_id: UserId,
    pub bid_amount: Amount,
}

/// 즉시 구매 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BuyNowCommand {
    pub auction_id: AuctionId,
    pub buyer_id: UserId,
}

/// 입찰 금액 검증
/// 입찰이 없으면 시작가 이상, 있으면 최고 입찰가 초과여야 한다.
pub fn check_bid_amount(auction: &Auction, amount: Amount) -> Result<(), AuctionError> {
    match auction.highest_bid() {
        Some(highest) if amount <= highest.amount => Err(AuctionError::BidTooLow {
            amount,
            minimum: highest.amount.saturating_add(1),
        }),
        None if amount < auction.starting_price => Err(AuctionError::BidTooLow {
            amount,
            minimum: auction.starting_price,
        }),
        _ => Ok(()),
    }
}

/// 1. 입찰
pub async fn handle_place_bid(
    cmd: PlaceBidCommand,
    store: &dyn AuctionStore,
    clock: &dyn Clock,
) -> Result<(Bid, AuctionEvent), AuctionError> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);
    let cmd = &cmd;

    retry_on_conflict(cmd.auction_id, || async move {
        let auction = load_auction(store, cmd.auction_id).await?;
        let now = clock.now();

        // 경매 상태 및 시간 검증
        if !auction.is_open_at(now) {
            return Err(AuctionError::NotActive(cmd.auction_id));
        }
        check_bid_amount(&auction, cmd.bid_amount)?;

        let new_bid = NewBid {
            bidder_id: cmd.bidder_id,
            amount: cmd.bid_amount,
            bid_time: now,
        };
        let outcome = store
            .commit(cmd.auction_id, auction.version, AuctionChange::append_bid(new_bid))
            .await?;
        let bid = outcome
            .bid
            .ok_or_else(|| StoreError::Corrupt("입찰이 기록되지 않았습니다".to_string()))?;

        info!(
            "{:<12} --> 입찰 성공: auction={}, 현재 가격 {}",
            "Command",
            cmd.auction_id,
            outcome.auction.current_bid()
        );
        let event = AuctionEvent::BidPlaced {
            auction_id: cmd.auction_id,
            bidder_id: cmd.bidder_id,
            bid_amount: bid.amount,
            timestamp: now,
        };
        Ok((bid, event))
    })
    .await
}

/// 2. 즉시 구매(낙찰)
/// 종료 처리와 즉시 구매가 입찰 기록을 한 번의 커밋으로 적용한다.
pub async fn handle_buy_now(
    cmd: BuyNowCommand,
    store: &dyn AuctionStore,
    clock: &dyn Clock,
) -> Result<(Auction, AuctionEvent), AuctionError> {
    info!("{:<12} --> 즉시 구매 요청 처리 시작: {:?}", "Command", cmd);
    let cmd = &cmd;

    retry_on_conflict(cmd.auction_id, || async move {
        let auction = load_auction(store, cmd.auction_id).await?;
        let now = clock.now();

        if !auction.is_open_at(now) {
            return Err(AuctionError::NotActive(cmd.auction_id));
        }

        let mut change = AuctionChange::finish(Some(cmd.buyer_id));
        change.end_time = Some(now);
        change.bid = Some(NewBid {
            bidder_id: cmd.buyer_id,
            amount: auction.buy_now_price,
            bid_time: now,
        });

        let outcome = store
            .commit(cmd.auction_id, auction.version, change)
            .await?;

        info!(
            "{:<12} --> 즉시 구매 성공: auction={}, 최종 가격 {}",
            "Command", cmd.auction_id, auction.buy_now_price
        );
        let event = AuctionEvent::BuyNowExecuted {
            auction_id: cmd.auction_id,
            buyer_id: cmd.buyer_id,
            price: auction.buy_now_price,
            timestamp: now,
        };
        Ok((outcome.auction, event))
    })
    .await
}

/// 3. 추천 입찰가 (최고 입찰가 + 1, 없으면 시작가 + 1)
/// 참고용 계산이며 입찰 검증에는 사용하지 않는다.
pub async fn suggested_bid(
    store: &dyn AuctionStore,
    auction_id: AuctionId,
) -> Result<Amount, AuctionError> {
    let auction = load_auction(store, auction_id).await?;
    Ok(auction.current_bid().saturating_add(1))
}

// endregion: --- Commands
