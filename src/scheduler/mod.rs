/// 경매 만료 스케줄러
/// 종료 시간이 지난 ACTIVE 경매를 FINISHED 로 전환하고 최고 입찰자를 낙찰자로 지정한다.
/// 경매마다 버전 비교 커밋 한 번으로 처리되므로 중간에 멈춘 스윕도 다시 실행하면 된다.
// region:    --- Imports
use crate::auction::events::AuctionEvent;
use crate::auction::model::{AuctionId, AuctionStatus, Bid};
use crate::auction::retry_on_conflict;
use crate::clock::Clock;
use crate::error::AuctionError;
use crate::message_broker::EventPublisher;
use crate::store::{AuctionChange, AuctionQuery, AuctionStore};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

// endregion: --- Imports

// region:    --- Winner Selection
/// 낙찰 입찰 선택: 최고 금액, 같은 금액이면 먼저 들어온 입찰 (그다음 낮은 id)
pub fn select_winning_bid(bids: &[Bid]) -> Option<&Bid> {
    bids.iter().min_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then(a.bid_time.cmp(&b.bid_time))
            .then(a.id.cmp(&b.id))
    })
}
// endregion: --- Winner Selection

// region:    --- Expiration Sweep
/// 만료된 경매 하나를 종료
/// 이미 다른 경로로 종료됐거나 아직 만료 전이면 None.
async fn close_expired_auction(
    store: &dyn AuctionStore,
    auction_id: AuctionId,
    now: DateTime<Utc>,
) -> Result<Option<AuctionEvent>, AuctionError> {
    retry_on_conflict(auction_id, || async move {
        let auction = match store.find_auction(auction_id).await? {
            Some(auction) => auction,
            None => return Ok(None),
        };
        if auction.status != AuctionStatus::Active || auction.end_time > now {
            return Ok(None);
        }

        let winning_bid = select_winning_bid(&auction.bids);
        let winner_id = winning_bid.map(|bid| bid.bidder_id);
        let final_price = winning_bid.map(|bid| bid.amount);

        store
            .commit(auction_id, auction.version, AuctionChange::finish(winner_id))
            .await?;

        Ok(Some(AuctionEvent::AuctionClosed {
            auction_id,
            winner_id,
            final_price,
            timestamp: now,
        }))
    })
    .await
}

/// 만료 스윕 실행
/// 경매별 실패는 로그만 남기고 나머지를 계속 처리한다. 종료한 경매 수를 반환.
pub async fn run_expiration_sweep(
    store: &dyn AuctionStore,
    publisher: &dyn EventPublisher,
    now: DateTime<Utc>,
) -> usize {
    let query = AuctionQuery {
        statuses: vec![AuctionStatus::Active],
        ends_at_or_before: Some(now),
        ..Default::default()
    };

    let expired = match store.find_auctions(&query).await {
        Ok(expired) => expired,
        Err(e) => {
            error!(
                "{:<12} --> 만료 경매 조회 중 오류 발생: {:?}",
                "Scheduler", e
            );
            return 0;
        }
    };

    let mut closed = 0;
    for auction in expired {
        match close_expired_auction(store, auction.id, now).await {
            Ok(Some(event)) => {
                closed += 1;
                info!("{:<12} --> 경매 종료: {:?}", "Scheduler", event);
                if let Err(e) = publisher.publish(&event).await {
                    warn!("{:<12} --> 이벤트 발행 실패: {:?}", "Scheduler", e);
                }
            }
            Ok(None) => debug!(
                "{:<12} --> 이미 처리된 경매 건너뜀: id={}",
                "Scheduler", auction.id
            ),
            Err(e) => error!(
                "{:<12} --> 경매 종료 중 오류 발생: id={}, {:?}",
                "Scheduler", auction.id, e
            ),
        }
    }

    debug!("{:<12} --> 만료 스윕 완료: {}건 종료", "Scheduler", closed);
    closed
}
// endregion: --- Expiration Sweep

// region:    --- Expiration Sweeper
/// 만료 스윕 주기 실행기
pub struct ExpirationSweeper {
    store: Arc<dyn AuctionStore>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    period: Duration,
}

/// 실행 중인 스케줄러 핸들
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ExpirationSweeper {
    pub fn new(
        store: Arc<dyn AuctionStore>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        period: Duration,
    ) -> Self {
        Self {
            store,
            publisher,
            clock,
            period,
        }
    }

    /// 경매 상태 업데이트 스케줄러 시작
    /// 진행 중인 스윕은 끝까지 수행한 뒤 종료 신호를 확인한다.
    pub fn start(self) -> SweeperHandle {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        info!(
            "{:<12} --> 만료 스케줄러 시작 (주기: {:?})",
            "Scheduler", self.period
        );

        let task = tokio::spawn(async move {
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let now = self.clock.now();
                        run_expiration_sweep(self.store.as_ref(), self.publisher.as_ref(), now).await;
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("{:<12} --> 만료 스케줄러 종료", "Scheduler");
        });

        SweeperHandle { shutdown, task }
    }
}

impl SweeperHandle {
    /// 스케줄러 중지 및 종료 대기
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            error!("{:<12} --> 스케줄러 태스크 오류: {:?}", "Scheduler", e);
        }
    }
}
// endregion: --- Expiration Sweeper
