pub mod commands;
pub mod events;
pub mod model;
pub mod policy;
pub mod validation;

// region:    --- Imports
use crate::error::AuctionError;
use crate::store::{AuctionStore, StoreError};
use model::{Auction, AuctionId};
use std::future::Future;
use tracing::warn;

// endregion: --- Imports

// 최대 재시도 횟수
pub const MAX_RETRIES: u32 = 100;

/// 경매 조회 (없으면 NotFound)
pub async fn load_auction(store: &dyn AuctionStore, id: AuctionId) -> Result<Auction, AuctionError> {
    store
        .find_auction(id)
        .await?
        .ok_or_else(|| AuctionError::auction_not_found(id))
}

/// 낙관적 업데이트 재시도
/// 시도마다 경매를 다시 읽고 검증하므로, 버전 충돌이면 처음부터 다시 수행한다.
pub async fn retry_on_conflict<T, F, Fut>(id: AuctionId, mut attempt: F) -> Result<T, AuctionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AuctionError>>,
{
    let mut retries = 0;

    while retries < MAX_RETRIES {
        match attempt().await {
            Err(AuctionError::Store(StoreError::VersionConflict(_))) => {
                warn!(
                    "{:<12} --> 낙관적 업데이트로 인한 버전 충돌: 재시도 (auction: {})",
                    "Command", id
                );
                retries += 1;
            }
            result => return result,
        }
    }

    Err(AuctionError::RetriesExhausted(id))
}
