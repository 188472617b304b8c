// region:    --- Imports
use super::{
    AuctionChange, AuctionQuery, AuctionRecord, AuctionStore, CommitOutcome, StoreError,
    UserStore,
};
use crate::accounts::{NewUser, User};
use crate::auction::model::{Auction, AuctionId, Bid, NewAuction, UserId};
use crate::database::DatabaseManager;
use crate::query::queries;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Postgres, QueryBuilder};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

// endregion: --- Imports

// region:    --- Rows
#[derive(FromRow)]
struct AuctionRow {
    id: i64,
    title: String,
    description: String,
    starting_price: i64,
    buy_now_price: i64,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    seller_id: i64,
    category: String,
    status: String,
    winner_id: Option<i64>,
    version: i64,
}

impl TryFrom<AuctionRow> for AuctionRecord {
    type Error = StoreError;

    fn try_from(row: AuctionRow) -> Result<Self, Self::Error> {
        Ok(AuctionRecord {
            id: row.id,
            title: row.title,
            description: row.description,
            starting_price: row.starting_price,
            buy_now_price: row.buy_now_price,
            start_time: row.start_time,
            end_time: row.end_time,
            seller_id: row.seller_id,
            category: row.category,
            status: row.status.parse().map_err(StoreError::Corrupt)?,
            winner_id: row.winner_id,
            version: row.version,
        })
    }
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    name: String,
    surname: String,
    login: String,
    password: String,
    role: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            surname: row.surname,
            login: row.login,
            password_hash: row.password,
            role: row.role.parse().map_err(StoreError::Corrupt)?,
        })
    }
}
// endregion: --- Rows

// region:    --- Postgres Store
/// PostgreSQL 저장소
/// 경매 변경은 `UPDATE ... WHERE id = $1 AND version = $2` 한 번으로 적용되고,
/// 입찰 추가는 같은 트랜잭션 안에서 기록된다.
pub struct PostgresStore {
    db: Arc<DatabaseManager>,
}

impl PostgresStore {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// 여러 경매의 입찰을 한 번에 읽어 경매 모델로 조립
    async fn attach_bids(&self, rows: Vec<AuctionRow>) -> Result<Vec<Auction>, StoreError> {
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let bids = sqlx::query_as::<_, Bid>(queries::GET_BIDS_FOR_AUCTIONS)
            .bind(ids)
            .fetch_all(self.db.pool())
            .await?;

        let mut by_auction: HashMap<AuctionId, Vec<Bid>> = HashMap::new();
        for bid in bids {
            by_auction.entry(bid.auction_id).or_default().push(bid);
        }

        rows.into_iter()
            .map(|row| {
                let bids = by_auction.remove(&row.id).unwrap_or_default();
                AuctionRecord::try_from(row).map(|record| record.into_auction(bids))
            })
            .collect()
    }
}

#[async_trait]
impl AuctionStore for PostgresStore {
    async fn insert_auction(&self, auction: NewAuction) -> Result<Auction, StoreError> {
        let row = self
            .db
            .transaction(move |tx| {
                Box::pin(async move {
                    sqlx::query_as::<_, AuctionRow>(queries::INSERT_AUCTION)
                        .bind(auction.title)
                        .bind(auction.description)
                        .bind(auction.starting_price)
                        .bind(auction.buy_now_price)
                        .bind(auction.start_time)
                        .bind(auction.end_time)
                        .bind(auction.seller_id)
                        .bind(auction.category)
                        .fetch_one(&mut **tx)
                        .await
                })
            })
            .await?;

        info!("{:<12} --> 경매 저장 id: {}", "Store", row.id);
        Ok(AuctionRecord::try_from(row)?.into_auction(Vec::new()))
    }

    async fn find_auction(&self, id: AuctionId) -> Result<Option<Auction>, StoreError> {
        let row = sqlx::query_as::<_, AuctionRow>(queries::GET_AUCTION)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        match row {
            Some(row) => Ok(self.attach_bids(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_auctions(&self, query: &AuctionQuery) -> Result<Vec<Auction>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(queries::select_auctions());

        if !query.statuses.is_empty() {
            let statuses: Vec<String> = query
                .statuses
                .iter()
                .map(|status| status.as_str().to_string())
                .collect();
            builder.push(" AND a.status = ANY(").push_bind(statuses).push(")");
        }
        if let Some(category) = &query.category {
            builder.push(" AND a.category = ").push_bind(category.clone());
        }
        if let Some(search) = &query.title_contains {
            builder
                .push(" AND POSITION(LOWER(")
                .push_bind(search.clone())
                .push(") IN LOWER(a.title)) > 0");
        }
        if let Some(seller_id) = query.seller_id {
            builder.push(" AND a.seller_id = ").push_bind(seller_id);
        }
        if let Some(winner_id) = query.winner_id {
            builder.push(" AND a.winner_id = ").push_bind(winner_id);
        }
        if let Some(bidder_id) = query.bidder_id {
            builder
                .push(" AND EXISTS (SELECT 1 FROM bids b WHERE b.auction_id = a.id AND b.bidder_id = ")
                .push_bind(bidder_id)
                .push(")");
        }
        if let Some(deadline) = query.ends_at_or_before {
            builder.push(" AND a.end_time <= ").push_bind(deadline);
        }
        builder.push(" ORDER BY a.id");

        let rows = builder
            .build_query_as::<AuctionRow>()
            .fetch_all(self.db.pool())
            .await?;
        debug!("{:<12} --> 경매 목록 조회: {}건", "Store", rows.len());

        self.attach_bids(rows).await
    }

    async fn bids_for_auction(&self, id: AuctionId) -> Result<Vec<Bid>, StoreError> {
        let exists: bool = sqlx::query_scalar(queries::AUCTION_EXISTS)
            .bind(id)
            .fetch_one(self.db.pool())
            .await?;
        if !exists {
            return Err(StoreError::NotFound(id));
        }

        Ok(sqlx::query_as::<_, Bid>(queries::GET_AUCTION_BIDS)
            .bind(id)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn commit(
        &self,
        id: AuctionId,
        expected_version: i64,
        change: AuctionChange,
    ) -> Result<CommitOutcome, StoreError> {
        self.db
            .transaction(move |tx| {
                Box::pin(async move {
                    // 버전이 같을 때만 갱신
                    let updated = sqlx::query_as::<_, AuctionRow>(queries::COMMIT_AUCTION_CHANGE)
                        .bind(id)
                        .bind(expected_version)
                        .bind(change.status.map(|status| status.as_str()))
                        .bind(change.winner_id)
                        .bind(change.end_time)
                        .bind(change.title)
                        .bind(change.description)
                        .bind(change.buy_now_price)
                        .bind(change.category)
                        .fetch_optional(&mut **tx)
                        .await?;

                    let row = match updated {
                        Some(row) => row,
                        None => {
                            let exists: bool = sqlx::query_scalar(queries::AUCTION_EXISTS)
                                .bind(id)
                                .fetch_one(&mut **tx)
                                .await?;
                            return Err(if exists {
                                StoreError::VersionConflict(id)
                            } else {
                                StoreError::NotFound(id)
                            });
                        }
                    };

                    // 입찰 기록 추가
                    let bid = match change.bid {
                        Some(new_bid) => Some(
                            sqlx::query_as::<_, Bid>(queries::INSERT_BID)
                                .bind(id)
                                .bind(new_bid.bidder_id)
                                .bind(new_bid.amount)
                                .bind(new_bid.bid_time)
                                .fetch_one(&mut **tx)
                                .await?,
                        ),
                        None => None,
                    };

                    let bids = sqlx::query_as::<_, Bid>(queries::GET_AUCTION_BIDS)
                        .bind(id)
                        .fetch_all(&mut **tx)
                        .await?;

                    let record = AuctionRecord::try_from(row)?;
                    debug!(
                        "{:<12} --> 경매 커밋 id: {}, version: {}",
                        "Store", id, record.version
                    );
                    Ok::<_, StoreError>(CommitOutcome {
                        auction: record.into_auction(bids),
                        bid,
                    })
                })
            })
            .await
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let login = user.login.clone();
        let result = sqlx::query_as::<_, UserRow>(queries::INSERT_USER)
            .bind(user.name)
            .bind(user.surname)
            .bind(user.login)
            .bind(user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(self.db.pool())
            .await;

        match result {
            Ok(row) => User::try_from(row),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::LoginTaken(login))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, UserRow>(queries::GET_USER)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, UserRow>(queries::GET_USER_BY_LOGIN)
            .bind(login)
            .fetch_optional(self.db.pool())
            .await?
            .map(User::try_from)
            .transpose()
    }
}
// endregion: --- Postgres Store
