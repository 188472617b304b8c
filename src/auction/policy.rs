use super::model::Auction;
use crate::accounts::RequestContext;

/// 경매 변경 권한: 관리자이거나 판매자 본인
pub fn can_modify(auction: &Auction, ctx: &RequestContext) -> bool {
    ctx.is_admin() || auction.seller_id == ctx.user_id
}
