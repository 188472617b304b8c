// region:    --- Imports
use super::{
    sort_bids, AuctionChange, AuctionQuery, AuctionRecord, AuctionStore, CommitOutcome,
    StoreError, UserStore,
};
use crate::accounts::{NewUser, User};
use crate::auction::model::{Auction, AuctionId, Bid, BidId, NewAuction, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

// endregion: --- Imports

// region:    --- Tables
/// 입찰 테이블 (경매별 인덱스 포함)
#[derive(Default)]
struct BidTable {
    rows: HashMap<BidId, Bid>,
    by_auction: HashMap<AuctionId, Vec<BidId>>,
}

impl BidTable {
    fn insert(&mut self, bid: Bid) {
        self.by_auction
            .entry(bid.auction_id)
            .or_default()
            .push(bid.id);
        self.rows.insert(bid.id, bid);
    }

    fn for_auction(&self, auction_id: AuctionId) -> Vec<Bid> {
        let mut bids: Vec<Bid> = self
            .by_auction
            .get(&auction_id)
            .map(|ids| ids.iter().filter_map(|id| self.rows.get(id)).cloned().collect())
            .unwrap_or_default();
        sort_bids(&mut bids);
        bids
    }
}

struct Sequence(AtomicI64);

impl Default for Sequence {
    fn default() -> Self {
        Sequence(AtomicI64::new(1))
    }
}

impl Sequence {
    fn next(&self) -> i64 {
        self.0.fetch_add(1, Ordering::SeqCst)
    }
}
// endregion: --- Tables

// region:    --- Memory Store
/// 인메모리 저장소
/// 경매 행마다 Mutex 를 두어 같은 경매에 대한 쓰기만 직렬화한다.
/// 잠금 순서는 항상 경매 행 -> 입찰 테이블.
#[derive(Default)]
pub struct MemoryStore {
    auctions: RwLock<HashMap<AuctionId, Arc<Mutex<AuctionRecord>>>>,
    bids: RwLock<BidTable>,
    users: RwLock<HashMap<UserId, User>>,
    auction_ids: Sequence,
    bid_ids: Sequence,
    user_ids: Sequence,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn row(&self, id: AuctionId) -> Option<Arc<Mutex<AuctionRecord>>> {
        self.auctions.read().await.get(&id).cloned()
    }

    /// 행 잠금을 잡은 상태에서 입찰까지 읽어 일관된 스냅샷을 만든다.
    async fn snapshot(&self, row: &Mutex<AuctionRecord>) -> Auction {
        let record = row.lock().await;
        let bids = self.bids.read().await.for_auction(record.id);
        record.clone().into_auction(bids)
    }
}

#[async_trait]
impl AuctionStore for MemoryStore {
    async fn insert_auction(&self, auction: NewAuction) -> Result<Auction, StoreError> {
        let id = self.auction_ids.next();
        let record = AuctionRecord::new(id, auction);
        let snapshot = record.clone().into_auction(Vec::new());
        self.auctions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(record)));
        debug!("{:<12} --> 경매 저장 id: {}", "Store", id);
        Ok(snapshot)
    }

    async fn find_auction(&self, id: AuctionId) -> Result<Option<Auction>, StoreError> {
        match self.row(id).await {
            Some(row) => Ok(Some(self.snapshot(&row).await)),
            None => Ok(None),
        }
    }

    async fn find_auctions(&self, query: &AuctionQuery) -> Result<Vec<Auction>, StoreError> {
        let mut rows: Vec<(AuctionId, Arc<Mutex<AuctionRecord>>)> = self
            .auctions
            .read()
            .await
            .iter()
            .map(|(id, row)| (*id, Arc::clone(row)))
            .collect();
        rows.sort_by_key(|(id, _)| *id);

        let mut auctions = Vec::new();
        for (_, row) in rows {
            let auction = self.snapshot(&row).await;
            if query.matches(&auction) {
                auctions.push(auction);
            }
        }
        Ok(auctions)
    }

    async fn bids_for_auction(&self, id: AuctionId) -> Result<Vec<Bid>, StoreError> {
        if self.row(id).await.is_none() {
            return Err(StoreError::NotFound(id));
        }
        Ok(self.bids.read().await.for_auction(id))
    }

    async fn commit(
        &self,
        id: AuctionId,
        expected_version: i64,
        change: AuctionChange,
    ) -> Result<CommitOutcome, StoreError> {
        let row = self.row(id).await.ok_or(StoreError::NotFound(id))?;
        let mut record = row.lock().await;

        if record.version != expected_version {
            return Err(StoreError::VersionConflict(id));
        }

        let bid = change.bid.as_ref().map(|new_bid| Bid {
            id: self.bid_ids.next(),
            auction_id: id,
            bidder_id: new_bid.bidder_id,
            amount: new_bid.amount,
            bid_time: new_bid.bid_time,
        });

        let mut bids = self.bids.write().await;
        if let Some(bid) = &bid {
            bids.insert(bid.clone());
        }
        record.apply(&change);

        debug!(
            "{:<12} --> 경매 커밋 id: {}, version: {}",
            "Store", id, record.version
        );

        Ok(CommitOutcome {
            auction: record.clone().into_auction(bids.for_auction(id)),
            bid,
        })
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.login == user.login) {
            return Err(StoreError::LoginTaken(user.login));
        }
        let user = User {
            id: self.user_ids.next(),
            name: user.name,
            surname: user.surname,
            login: user.login,
            password_hash: user.password_hash,
            role: user.role,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.login == login)
            .cloned())
    }
}
// endregion: --- Memory Store

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::{AuctionStatus, NewBid};
    use chrono::{Duration, Utc};

    fn new_auction() -> NewAuction {
        let now = Utc::now();
        NewAuction {
            title: "Rare Comic Book".to_string(),
            description: "First edition".to_string(),
            starting_price: 50,
            buy_now_price: 60,
            start_time: now,
            end_time: now + Duration::days(1),
            seller_id: 1,
            category: "Collectibles".to_string(),
        }
    }

    #[tokio::test]
    async fn commit_rejects_stale_version() {
        let store = MemoryStore::new();
        let auction = store.insert_auction(new_auction()).await.unwrap();
        let bid = NewBid {
            bidder_id: 2,
            amount: 55,
            bid_time: Utc::now(),
        };

        let outcome = store
            .commit(auction.id, 0, AuctionChange::append_bid(bid.clone()))
            .await
            .unwrap();
        assert_eq!(outcome.auction.version, 1);
        assert_eq!(outcome.auction.bids.len(), 1);

        let stale = store
            .commit(auction.id, 0, AuctionChange::append_bid(bid))
            .await;
        assert!(matches!(stale, Err(StoreError::VersionConflict(id)) if id == auction.id));
        assert_eq!(store.bids_for_auction(auction.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn finds_auctions_by_bidder_and_status() {
        let store = MemoryStore::new();
        let first = store.insert_auction(new_auction()).await.unwrap();
        let second = store.insert_auction(new_auction()).await.unwrap();
        store
            .commit(
                second.id,
                0,
                AuctionChange::append_bid(NewBid {
                    bidder_id: 42,
                    amount: 51,
                    bid_time: Utc::now(),
                }),
            )
            .await
            .unwrap();
        store
            .commit(first.id, 0, AuctionChange::remove())
            .await
            .unwrap();

        let query = AuctionQuery {
            statuses: vec![AuctionStatus::Active],
            bidder_id: Some(42),
            ..Default::default()
        };
        let found = store.find_auctions(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, second.id);

        let removed = store
            .find_auctions(&AuctionQuery::with_statuses(&[AuctionStatus::Removed]))
            .await
            .unwrap();
        assert_eq!(removed[0].id, first.id);
    }

    #[tokio::test]
    async fn unknown_auction_is_not_found() {
        let store = MemoryStore::new();
        assert!(store.find_auction(99).await.unwrap().is_none());
        assert!(matches!(
            store.commit(99, 0, AuctionChange::remove()).await,
            Err(StoreError::NotFound(99))
        ));
    }
}
