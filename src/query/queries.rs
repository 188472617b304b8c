/// 경매 컬럼 목록
const AUCTION_COLUMNS: &str = "id, title, description, starting_price, buy_now_price, start_time, end_time, seller_id, category, status, winner_id, version";

/// 경매 등록
pub const INSERT_AUCTION: &str = r#"
    INSERT INTO auctions (title, description, starting_price, buy_now_price, start_time, end_time, seller_id, category, status, version)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'ACTIVE', 0)
    RETURNING id, title, description, starting_price, buy_now_price, start_time, end_time, seller_id, category, status, winner_id, version
"#;

/// 경매 조회
pub const GET_AUCTION: &str = "SELECT id, title, description, starting_price, buy_now_price, start_time, end_time, seller_id, category, status, winner_id, version FROM auctions WHERE id = $1";

/// 경매 목록 조회 (조건은 QueryBuilder 로 덧붙임)
pub fn select_auctions() -> String {
    format!("SELECT {} FROM auctions a WHERE TRUE", AUCTION_COLUMNS)
}

/// 경매 존재 여부
pub const AUCTION_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM auctions WHERE id = $1)";

/// 버전 비교 후 경매 변경 (NULL 인 값은 기존 값 유지)
pub const COMMIT_AUCTION_CHANGE: &str = r#"
    UPDATE auctions SET
        status = COALESCE($3, status),
        winner_id = COALESCE($4, winner_id),
        end_time = COALESCE($5, end_time),
        title = COALESCE($6, title),
        description = COALESCE($7, description),
        buy_now_price = COALESCE($8, buy_now_price),
        category = COALESCE($9, category),
        version = version + 1
    WHERE id = $1 AND version = $2
    RETURNING id, title, description, starting_price, buy_now_price, start_time, end_time, seller_id, category, status, winner_id, version
"#;

/// 입찰 기록 추가
pub const INSERT_BID: &str = r#"
    INSERT INTO bids (auction_id, bidder_id, amount, bid_time)
    VALUES ($1, $2, $3, $4)
    RETURNING id, auction_id, bidder_id, amount, bid_time
"#;

/// 경매 입찰 조회 (금액 내림차순)
pub const GET_AUCTION_BIDS: &str = r#"
    SELECT id, auction_id, bidder_id, amount, bid_time
    FROM bids
    WHERE auction_id = $1
    ORDER BY amount DESC, bid_time ASC, id ASC
"#;

/// 여러 경매의 입찰 조회
pub const GET_BIDS_FOR_AUCTIONS: &str = r#"
    SELECT id, auction_id, bidder_id, amount, bid_time
    FROM bids
    WHERE auction_id = ANY($1)
    ORDER BY amount DESC, bid_time ASC, id ASC
"#;

/// 사용자 등록
pub const INSERT_USER: &str = r#"
    INSERT INTO users (name, surname, login, password, role)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING id, name, surname, login, password, role
"#;

/// 사용자 조회
pub const GET_USER: &str =
    "SELECT id, name, surname, login, password, role FROM users WHERE id = $1";

/// 로그인으로 사용자 조회
pub const GET_USER_BY_LOGIN: &str =
    "SELECT id, name, surname, login, password, role FROM users WHERE login = $1";
