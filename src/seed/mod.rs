/// 샘플 데이터 초기화
/// 사용자 3명과 카테고리별 경매 6개를 만든다. 금액은 최소 단위(센트).
// region:    --- Imports
use crate::accounts::{hash_password, NewUser, RequestContext, Role, User};
use crate::auction::model::{Amount, AuctionDraft};
use crate::error::AuctionError;
use crate::service::AuctionService;
use crate::store::UserStore;
use chrono::Duration;
use tracing::info;

// endregion: --- Imports

const AUCTION_DAYS: i64 = 7;

struct SampleUser {
    name: &'static str,
    surname: &'static str,
    login: &'static str,
    password: &'static str,
    role: Role,
}

const SAMPLE_USERS: [SampleUser; 3] = [
    SampleUser {
        name: "Janusz",
        surname: "Kowalski",
        login: "janusz",
        password: "janusz123",
        role: Role::User,
    },
    SampleUser {
        name: "Wiesiek",
        surname: "Admin",
        login: "wiesiek",
        password: "wiesiek123",
        role: Role::Admin,
    },
    SampleUser {
        name: "admin",
        surname: "admin",
        login: "admin",
        password: "admin",
        role: Role::Admin,
    },
];

/// (제목, 설명, 시작가, 즉시 구매가, 판매자 인덱스, 카테고리)
const SAMPLE_AUCTIONS: [(&str, &str, Amount, Amount, usize, &str); 6] = [
    (
        "Luxury Apartment",
        "Spacious 3-bedroom apartment with a view",
        50_000_000,
        55_000_000,
        0,
        "Real Estate",
    ),
    (
        "Vintage Car",
        "1965 Ford Mustang in excellent condition",
        3_500_000,
        4_000_000,
        1,
        "Automotive",
    ),
    (
        "Antique Vase",
        "18th century Chinese porcelain vase",
        500_000,
        700_000,
        2,
        "Art and Antiques",
    ),
    (
        "Designer Handbag",
        "Limited edition Louis Vuitton bag",
        200_000,
        250_000,
        0,
        "Fashion and Accessories",
    ),
    (
        "Rare Comic Book",
        "First edition Superman comic",
        5_000_000,
        6_000_000,
        1,
        "Collectibles",
    ),
    (
        "Diamond Necklace",
        "18k gold necklace with 2 carat diamond pendant",
        1_500_000,
        1_800_000,
        2,
        "Jewelry",
    ),
];

/// 샘플 데이터 생성
/// 샘플 사용자가 이미 있으면 아무것도 하지 않는다. 생성한 경매 수 반환.
/// 샘플 계정 "admin" 은 가입 검증 길이 제한보다 짧아 저장소에 직접 기록한다.
pub async fn initialize_sample_data(
    users: &dyn UserStore,
    service: &AuctionService,
) -> Result<usize, AuctionError> {
    if users.find_user_by_login(SAMPLE_USERS[0].login).await?.is_some() {
        info!("{:<12} --> 샘플 데이터가 이미 있어 건너뜀", "Seed");
        return Ok(0);
    }

    let mut sellers: Vec<User> = Vec::with_capacity(SAMPLE_USERS.len());
    for sample in &SAMPLE_USERS {
        let user = users
            .insert_user(NewUser {
                name: sample.name.to_string(),
                surname: sample.surname.to_string(),
                login: sample.login.to_string(),
                password_hash: hash_password(sample.password),
                role: sample.role,
            })
            .await?;
        sellers.push(user);
    }

    let end_time = service.now() + Duration::days(AUCTION_DAYS);
    let mut created = 0;
    for (title, description, starting_price, buy_now_price, seller, category) in SAMPLE_AUCTIONS {
        let ctx = RequestContext::from(&sellers[seller]);
        let draft = AuctionDraft {
            title: title.to_string(),
            description: description.to_string(),
            starting_price,
            buy_now_price,
            end_time,
            category: category.to_string(),
        };
        service.create_auction(draft, &ctx).await?;
        created += 1;
    }

    info!(
        "{:<12} --> 샘플 데이터 초기화 완료: 사용자 {}명, 경매 {}개",
        "Seed",
        sellers.len(),
        created
    );
    Ok(created)
}
