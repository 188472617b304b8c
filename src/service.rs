/// 경매 서비스
/// 외부 계층(웹, 세션)이 호출하는 진입점. 커맨드와 조회를 묶고,
/// 커밋된 상태 변화마다 이벤트를 발행한다.
// region:    --- Imports
use crate::accounts::RequestContext;
use crate::auction::commands::{
    handle_create_auction, handle_remove_auction, handle_update_auction,
};
use crate::auction::events::AuctionEvent;
use crate::auction::model::{
    Amount, Auction, AuctionDraft, AuctionId, AuctionPatch, Bid, UserId,
};
use crate::bidding::commands::{
    handle_buy_now, handle_place_bid, suggested_bid, BuyNowCommand, PlaceBidCommand,
};
use crate::clock::{Clock, SystemClock};
use crate::error::AuctionError;
use crate::message_broker::{EventPublisher, TracingPublisher};
use crate::query::handlers::{self, AuctionFilter};
use crate::scheduler::{self, ExpirationSweeper};
use crate::store::AuctionStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::time::Duration;
use tracing::warn;

// endregion: --- Imports

#[derive(Clone)]
pub struct AuctionService {
    store: Arc<dyn AuctionStore>,
    clock: Arc<dyn Clock>,
    publisher: Arc<dyn EventPublisher>,
}

impl AuctionService {
    pub fn new(store: Arc<dyn AuctionStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            publisher: Arc::new(TracingPublisher),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// 발행 실패는 로그만 남긴다 (이미 커밋된 변경은 유지)
    async fn publish(&self, event: AuctionEvent) {
        if let Err(e) = self.publisher.publish(&event).await {
            warn!(
                "{:<12} --> 이벤트 발행 실패: type={}, {:?}",
                "Service",
                event.event_type(),
                e
            );
        }
    }

    // region:    --- Commands
    pub async fn create_auction(
        &self,
        draft: AuctionDraft,
        ctx: &RequestContext,
    ) -> Result<AuctionId, AuctionError> {
        let (auction, event) =
            handle_create_auction(draft, ctx, self.store.as_ref(), self.clock.as_ref()).await?;
        self.publish(event).await;
        Ok(auction.id)
    }

    pub async fn place_bid(
        &self,
        auction_id: AuctionId,
        amount: Amount,
        ctx: &RequestContext,
    ) -> Result<Bid, AuctionError> {
        let cmd = PlaceBidCommand {
            auction_id,
            bidder_id: ctx.user_id,
            bid_amount: amount,
        };
        let (bid, event) = handle_place_bid(cmd, self.store.as_ref(), self.clock.as_ref()).await?;
        self.publish(event).await;
        Ok(bid)
    }

    pub async fn buy_now(
        &self,
        auction_id: AuctionId,
        ctx: &RequestContext,
    ) -> Result<Auction, AuctionError> {
        let cmd = BuyNowCommand {
            auction_id,
            buyer_id: ctx.user_id,
        };
        let (auction, event) = handle_buy_now(cmd, self.store.as_ref(), self.clock.as_ref()).await?;
        self.publish(event).await;
        Ok(auction)
    }

    pub async fn update_auction(
        &self,
        auction_id: AuctionId,
        patch: AuctionPatch,
        ctx: &RequestContext,
    ) -> Result<Auction, AuctionError> {
        let (auction, event) = handle_update_auction(
            auction_id,
            patch,
            ctx,
            self.store.as_ref(),
            self.clock.as_ref(),
        )
        .await?;
        if let Some(event) = event {
            self.publish(event).await;
        }
        Ok(auction)
    }

    pub async fn remove_auction(
        &self,
        auction_id: AuctionId,
        ctx: &RequestContext,
    ) -> Result<(), AuctionError> {
        let (_, event) =
            handle_remove_auction(auction_id, ctx, self.store.as_ref(), self.clock.as_ref())
                .await?;
        self.publish(event).await;
        Ok(())
    }

    pub async fn suggested_bid(&self, auction_id: AuctionId) -> Result<Amount, AuctionError> {
        suggested_bid(self.store.as_ref(), auction_id).await
    }
    // endregion: --- Commands

    // region:    --- Queries
    pub async fn get_auction(&self, auction_id: AuctionId) -> Result<Auction, AuctionError> {
        handlers::get_auction(self.store.as_ref(), auction_id).await
    }

    pub async fn list_auctions(&self, filter: &AuctionFilter) -> Result<Vec<Auction>, AuctionError> {
        handlers::list_auctions(self.store.as_ref(), filter).await
    }

    pub async fn bids_for_auction(&self, auction_id: AuctionId) -> Result<Vec<Bid>, AuctionError> {
        handlers::get_bids_for_auction(self.store.as_ref(), auction_id).await
    }

    pub async fn highest_bid(&self, auction_id: AuctionId) -> Result<Option<Amount>, AuctionError> {
        handlers::get_highest_bid(self.store.as_ref(), auction_id).await
    }

    pub async fn auctions_with_user_bids(
        &self,
        user_id: UserId,
        category: Option<String>,
        search: Option<String>,
    ) -> Result<Vec<Auction>, AuctionError> {
        handlers::get_auctions_with_user_bids(self.store.as_ref(), user_id, category, search).await
    }

    pub async fn auctions_by_seller(&self, seller_id: UserId) -> Result<Vec<Auction>, AuctionError> {
        handlers::get_auctions_by_seller(self.store.as_ref(), seller_id).await
    }

    pub async fn user_purchases(&self, user_id: UserId) -> Result<Vec<Auction>, AuctionError> {
        handlers::get_user_purchases(self.store.as_ref(), user_id).await
    }

    pub async fn finished_auctions(&self) -> Result<Vec<Auction>, AuctionError> {
        handlers::get_finished_auctions(self.store.as_ref()).await
    }

    pub async fn archived_auctions(&self) -> Result<Vec<Auction>, AuctionError> {
        handlers::get_archived_auctions(self.store.as_ref()).await
    }
    // endregion: --- Queries

    // region:    --- Expiration
    /// 만료 스윕 1회 실행, 종료한 경매 수 반환
    pub async fn run_expiration_sweep(&self, now: DateTime<Utc>) -> usize {
        scheduler::run_expiration_sweep(self.store.as_ref(), self.publisher.as_ref(), now).await
    }

    /// 서비스와 같은 저장소/시계/발행자를 쓰는 주기 스케줄러
    pub fn sweeper(&self, period: Duration) -> ExpirationSweeper {
        ExpirationSweeper::new(
            Arc::clone(&self.store),
            Arc::clone(&self.publisher),
            Arc::clone(&self.clock),
            period,
        )
    }
    // endregion: --- Expiration
}
