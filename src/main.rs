// region:    --- Imports
use auction_marketplace::config::Config;
use auction_marketplace::database::DatabaseManager;
use auction_marketplace::message_broker::{EventPublisher, TracingPublisher};
use auction_marketplace::seed::initialize_sample_data;
use auction_marketplace::store::{AuctionStore, MemoryStore, PostgresStore, UserStore};
use auction_marketplace::AuctionService;
use std::sync::Arc;
use tracing::{error, info, warn};
// endregion: --- Imports

type Stores = (Arc<dyn AuctionStore>, Arc<dyn UserStore>);

/// 설정에 따라 PostgreSQL 또는 인메모리 저장소 생성
async fn open_stores(config: &Config) -> Result<Stores, Box<dyn std::error::Error>> {
    let Some(db_config) = &config.database else {
        info!("{:<12} --> DATABASE_URL 없음: 인메모리 저장소 사용", "Main");
        let store = Arc::new(MemoryStore::new());
        let auctions: Arc<dyn AuctionStore> = store.clone();
        let users: Arc<dyn UserStore> = store;
        return Ok((auctions, users));
    };

    // DatabaseManager 생성
    let db_manager = Arc::new(DatabaseManager::new(db_config).await?);

    // 데이터베이스 초기화
    if let Err(e) = db_manager.initialize_database(db_config.reset).await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    let store = Arc::new(PostgresStore::new(db_manager));
    let auctions: Arc<dyn AuctionStore> = store.clone();
    let users: Arc<dyn UserStore> = store;
    Ok((auctions, users))
}

#[cfg(feature = "kafka")]
async fn open_publisher(config: &Config) -> Result<Arc<dyn EventPublisher>, Box<dyn std::error::Error>> {
    use auction_marketplace::message_broker::KafkaPublisher;

    let Some(kafka) = &config.kafka else {
        return Ok(Arc::new(TracingPublisher));
    };
    let publisher = KafkaPublisher::new(&kafka.brokers, &kafka.topic)?;
    // 토픽 생성
    if let Err(e) = publisher.create_topic(5, 1).await {
        warn!("{:<12} --> Kafka 토픽 생성 건너뜀: {}", "Main", e);
    }
    info!("{:<12} --> Kafka 초기화 성공", "Main");
    Ok(Arc::new(publisher))
}

#[cfg(not(feature = "kafka"))]
async fn open_publisher(config: &Config) -> Result<Arc<dyn EventPublisher>, Box<dyn std::error::Error>> {
    if config.kafka.is_some() {
        warn!(
            "{:<12} --> kafka 기능 없이 빌드됨: KAFKA_BROKERS 무시",
            "Main"
        );
    }
    Ok(Arc::new(TracingPublisher))
}

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let config = Config::from_env()?;
    info!("{:<12} --> 설정 로드: {:?}", "Main", config.sweep_interval);

    let (auction_store, user_store) = open_stores(&config).await?;
    let publisher = open_publisher(&config).await?;
    let service = AuctionService::new(auction_store).with_publisher(publisher);

    if config.seed_sample_data {
        initialize_sample_data(user_store.as_ref(), &service).await?;
    }

    // 경매 만료 스케줄러
    let sweeper = service.sweeper(config.sweep_interval).start();

    info!("{:<12} --> 경매 서비스 실행 중 (Ctrl-C 로 종료)", "Main");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("{:<12} --> 종료 신호 대기 실패: {}", "Main", e);
    }

    sweeper.stop().await;
    info!("{:<12} --> 경매 서비스 종료", "Main");
    Ok(())
}
// endregion: --- Main
