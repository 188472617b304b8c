// region:    --- Imports
use crate::auction::load_auction;
use crate::auction::model::{Amount, Auction, AuctionId, AuctionStatus, Bid, UserId};
use crate::error::AuctionError;
use crate::store::{AuctionQuery, AuctionStore};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

// endregion: --- Imports

/// 전체 카테고리를 뜻하는 값
pub const ALL_CATEGORIES: &str = "All";

/// 등록 가능한 카테고리
pub const CATEGORIES: [&str; 6] = [
    "Real Estate",
    "Automotive",
    "Art and Antiques",
    "Fashion and Accessories",
    "Collectibles",
    "Jewelry",
];

// region:    --- Filter & Sort
/// 경매 정렬 기준
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionSort {
    /// 현재 가격 오름차순
    PriceAsc,
    /// 현재 가격 내림차순
    PriceDesc,
    /// 종료 시간 오름차순
    TimeAsc,
    /// 종료 시간 내림차순
    TimeDesc,
    /// 입찰 수 내림차순
    Popularity,
}

impl FromStr for AuctionSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price_asc" => Ok(AuctionSort::PriceAsc),
            "price_desc" => Ok(AuctionSort::PriceDesc),
            "time_asc" => Ok(AuctionSort::TimeAsc),
            "time_desc" => Ok(AuctionSort::TimeDesc),
            "popularity" => Ok(AuctionSort::Popularity),
            other => Err(format!("알 수 없는 정렬 기준: {}", other)),
        }
    }
}

/// 경매 목록 필터
/// 상태를 지정하지 않으면 ACTIVE, 카테고리 "All" 은 필터 없음.
/// 카테고리와 검색어는 함께 적용된다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuctionFilter {
    pub status: Option<AuctionStatus>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<AuctionSort>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl AuctionFilter {
    fn to_query(&self) -> AuctionQuery {
        AuctionQuery {
            statuses: vec![self.status.unwrap_or(AuctionStatus::Active)],
            category: non_blank(&self.category).filter(|c| c != ALL_CATEGORIES),
            title_contains: non_blank(&self.search),
            ..Default::default()
        }
    }
}

/// 정렬 (같은 값이면 기존 순서 유지)
pub fn sort_auctions(auctions: &mut [Auction], sort: AuctionSort) {
    match sort {
        AuctionSort::PriceAsc => auctions.sort_by_key(|a| a.current_bid()),
        AuctionSort::PriceDesc => auctions.sort_by(|a, b| b.current_bid().cmp(&a.current_bid())),
        AuctionSort::TimeAsc => auctions.sort_by_key(|a| a.end_time),
        AuctionSort::TimeDesc => auctions.sort_by(|a, b| b.end_time.cmp(&a.end_time)),
        AuctionSort::Popularity => auctions.sort_by(|a, b| b.bids.len().cmp(&a.bids.len())),
    }
}
// endregion: --- Filter & Sort

// region:    --- Query Handlers

/// 경매 조회
pub async fn get_auction(
    store: &dyn AuctionStore,
    auction_id: AuctionId,
) -> Result<Auction, AuctionError> {
    info!("{:<12} --> 경매 조회 id: {}", "Query", auction_id);
    load_auction(store, auction_id).await
}

/// 경매 목록 조회 (필터 + 정렬)
pub async fn list_auctions(
    store: &dyn AuctionStore,
    filter: &AuctionFilter,
) -> Result<Vec<Auction>, AuctionError> {
    info!("{:<12} --> 경매 목록 조회: {:?}", "Query", filter);
    let mut auctions = store.find_auctions(&filter.to_query()).await?;
    if let Some(sort) = filter.sort {
        sort_auctions(&mut auctions, sort);
    }
    Ok(auctions)
}

/// 경매 입찰 조회 (금액 내림차순)
pub async fn get_bids_for_auction(
    store: &dyn AuctionStore,
    auction_id: AuctionId,
) -> Result<Vec<Bid>, AuctionError> {
    info!("{:<12} --> 경매 입찰 조회 id: {}", "Query", auction_id);
    Ok(store.bids_for_auction(auction_id).await?)
}

/// 최고 입찰가 조회
pub async fn get_highest_bid(
    store: &dyn AuctionStore,
    auction_id: AuctionId,
) -> Result<Option<Amount>, AuctionError> {
    info!("{:<12} --> 최고 입찰가 조회 id: {}", "Query", auction_id);
    let bids = store.bids_for_auction(auction_id).await?;
    Ok(bids.first().map(|bid| bid.amount))
}

/// 사용자가 입찰한 진행 중 경매 조회 (카테고리 또는 검색어로 좁힐 수 있음)
pub async fn get_auctions_with_user_bids(
    store: &dyn AuctionStore,
    user_id: UserId,
    category: Option<String>,
    search: Option<String>,
) -> Result<Vec<Auction>, AuctionError> {
    info!("{:<12} --> 입찰한 경매 조회 user: {}", "Query", user_id);
    let query = AuctionQuery {
        statuses: vec![AuctionStatus::Active],
        bidder_id: Some(user_id),
        category: non_blank(&category).filter(|c| c != ALL_CATEGORIES),
        title_contains: non_blank(&search),
        ..Default::default()
    };
    Ok(store.find_auctions(&query).await?)
}

/// 판매자의 경매 조회 (모든 상태)
pub async fn get_auctions_by_seller(
    store: &dyn AuctionStore,
    seller_id: UserId,
) -> Result<Vec<Auction>, AuctionError> {
    info!("{:<12} --> 판매 경매 조회 seller: {}", "Query", seller_id);
    let query = AuctionQuery {
        seller_id: Some(seller_id),
        ..Default::default()
    };
    Ok(store.find_auctions(&query).await?)
}

/// 구매 내역 조회 (낙찰된 FINISHED 경매)
pub async fn get_user_purchases(
    store: &dyn AuctionStore,
    user_id: UserId,
) -> Result<Vec<Auction>, AuctionError> {
    info!("{:<12} --> 구매 내역 조회 user: {}", "Query", user_id);
    let query = AuctionQuery {
        statuses: vec![AuctionStatus::Finished],
        winner_id: Some(user_id),
        ..Default::default()
    };
    Ok(store.find_auctions(&query).await?)
}

/// 종료된 경매 조회
pub async fn get_finished_auctions(store: &dyn AuctionStore) -> Result<Vec<Auction>, AuctionError> {
    info!("{:<12} --> 종료 경매 조회", "Query");
    Ok(store
        .find_auctions(&AuctionQuery::with_statuses(&[AuctionStatus::Finished]))
        .await?)
}

/// 보관 경매 조회 (FINISHED + REMOVED)
pub async fn get_archived_auctions(store: &dyn AuctionStore) -> Result<Vec<Auction>, AuctionError> {
    info!("{:<12} --> 보관 경매 조회", "Query");
    Ok(store
        .find_auctions(&AuctionQuery::with_statuses(&[
            AuctionStatus::Finished,
            AuctionStatus::Removed,
        ]))
        .await?)
}

// endregion: --- Query Handlers
