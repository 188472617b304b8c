/// 경매 관리 커맨드 처리
/// 1. 경매 등록
/// 2. 경매 수정
/// 3. 경매 삭제
// region:    --- Imports
use super::events::AuctionEvent;
use super::model::{Auction, AuctionDraft, AuctionId, AuctionPatch, AuctionStatus, NewAuction};
use super::policy::can_modify;
use super::validation::{validate_draft, validate_patch};
use super::{load_auction, retry_on_conflict};
use crate::accounts::RequestContext;
use crate::clock::Clock;
use crate::error::AuctionError;
use crate::store::{AuctionChange, AuctionStore};
use tracing::info;

// endregion: --- Imports

// region:    --- Commands
/// 1. 경매 등록
pub async fn handle_create_auction(
    draft: AuctionDraft,
    ctx: &RequestContext,
    store: &dyn AuctionStore,
    clock: &dyn Clock,
) -> Result<(Auction, AuctionEvent), AuctionError> {
    info!(
        "{:<12} --> 경매 등록 요청 처리 시작: seller={}, title={}",
        "Command", ctx.user_id, draft.title
    );
    let now = clock.now();
    validate_draft(&draft, now)?;

    let auction = store
        .insert_auction(NewAuction {
            title: draft.title,
            description: draft.description,
            starting_price: draft.starting_price,
            buy_now_price: draft.buy_now_price,
            start_time: now,
            end_time: draft.end_time,
            seller_id: ctx.user_id,
            category: draft.category,
        })
        .await?;

    let event = AuctionEvent::AuctionCreated {
        auction_id: auction.id,
        seller_id: auction.seller_id,
        starting_price: auction.starting_price,
        end_time: auction.end_time,
        timestamp: now,
    };
    Ok((auction, event))
}

/// 2. 경매 수정 (판매자 또는 관리자)
/// 변경할 필드가 없으면 커밋하지 않고 이벤트도 만들지 않는다.
pub async fn handle_update_auction(
    auction_id: AuctionId,
    patch: AuctionPatch,
    ctx: &RequestContext,
    store: &dyn AuctionStore,
    clock: &dyn Clock,
) -> Result<(Auction, Option<AuctionEvent>), AuctionError> {
    info!(
        "{:<12} --> 경매 수정 요청 처리 시작: id={}, requester={}",
        "Command", auction_id, ctx.user_id
    );
    let patch = &patch;

    retry_on_conflict(auction_id, || async move {
        let auction = load_auction(store, auction_id).await?;

        if !can_modify(&auction, ctx) {
            return Err(AuctionError::Permission(auction_id));
        }
        if auction.status != AuctionStatus::Active {
            return Err(AuctionError::NotActive(auction_id));
        }
        if patch.is_empty() {
            return Ok((auction, None));
        }

        let now = clock.now();
        validate_patch(patch, &auction, now)?;

        let outcome = store
            .commit(auction_id, auction.version, AuctionChange::edit(patch.clone()))
            .await?;

        let event = AuctionEvent::AuctionUpdated {
            auction_id,
            editor_id: ctx.user_id,
            timestamp: now,
        };
        Ok((outcome.auction, Some(event)))
    })
    .await
}

/// 3. 경매 삭제 (판매자 또는 관리자)
/// 관리자가 아니면 입찰이 있는 경매는 삭제할 수 없다.
pub async fn handle_remove_auction(
    auction_id: AuctionId,
    ctx: &RequestContext,
    store: &dyn AuctionStore,
    clock: &dyn Clock,
) -> Result<(Auction, AuctionEvent), AuctionError> {
    info!(
        "{:<12} --> 경매 삭제 요청 처리 시작: id={}, requester={}",
        "Command", auction_id, ctx.user_id
    );

    retry_on_conflict(auction_id, || async move {
        let auction = load_auction(store, auction_id).await?;

        if !can_modify(&auction, ctx) {
            return Err(AuctionError::Permission(auction_id));
        }
        if auction.status.is_terminal() {
            return Err(AuctionError::NotActive(auction_id));
        }
        if !ctx.is_admin() && auction.has_bids() {
            return Err(AuctionError::HasBids(auction_id));
        }

        let outcome = store
            .commit(auction_id, auction.version, AuctionChange::remove())
            .await?;

        let event = AuctionEvent::AuctionRemoved {
            auction_id,
            removed_by: ctx.user_id,
            previous_status: auction.status,
            timestamp: clock.now(),
        };
        Ok((outcome.auction, event))
    })
    .await
}
// endregion: --- Commands
