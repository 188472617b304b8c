/// 경매 이벤트 발행
/// 커밋이 끝난 상태 변화만 발행하며, 발행 실패가 커밋을 되돌리지 않는다.
// region:    --- Imports
use crate::auction::events::AuctionEvent;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

#[cfg(feature = "kafka")]
pub mod kafka;

#[cfg(feature = "kafka")]
pub use kafka::KafkaPublisher;

// endregion: --- Imports

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("이벤트 직렬화 실패: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("메시지 전송 실패: {0}")]
    Send(String),
}

// region:    --- Event Publisher Trait
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &AuctionEvent) -> Result<(), PublishError>;
}
// endregion: --- Event Publisher Trait

// region:    --- Tracing Publisher
/// 브로커 없이 로그로만 이벤트를 남기는 기본 구현
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPublisher;

#[async_trait]
impl EventPublisher for TracingPublisher {
    async fn publish(&self, event: &AuctionEvent) -> Result<(), PublishError> {
        let payload = serde_json::to_string(event)?;
        info!(
            "{:<12} --> 이벤트 발행: type={}, auction={}, payload={}",
            "Publisher",
            event.event_type(),
            event.auction_id(),
            payload
        );
        Ok(())
    }
}
// endregion: --- Tracing Publisher

// region:    --- Memory Publisher
/// 발행된 이벤트를 메모리에 쌓아 두는 구현
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    events: Mutex<Vec<AuctionEvent>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<AuctionEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl EventPublisher for MemoryPublisher {
    async fn publish(&self, event: &AuctionEvent) -> Result<(), PublishError> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}
// endregion: --- Memory Publisher
