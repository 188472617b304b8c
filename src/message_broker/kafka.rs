// region:    --- Imports
use super::{EventPublisher, PublishError};
use crate::auction::events::AuctionEvent;
use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Kafka Publisher
/// 경매 이벤트를 Kafka 토픽으로 발행 (키: 경매 id)
#[derive(Clone)]
pub struct KafkaPublisher {
    producer: Arc<FutureProducer>,
    brokers: String,
    topic: String,
}

impl KafkaPublisher {
    pub fn new(brokers: &str, topic: &str) -> Result<Self, KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(KafkaPublisher {
            producer: Arc::new(producer),
            brokers: brokers.to_string(),
            topic: topic.to_string(),
        })
    }

    /// 토픽 생성
    pub async fn create_topic(
        &self,
        num_partitions: i32,
        replication_factor: i32,
    ) -> Result<(), PublishError> {
        info!("{:<12} --> Kafka 토픽 생성 시작: {}", "Publisher", self.topic);

        let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .create()
            .map_err(|e| PublishError::Send(format!("AdminClient 생성 실패: {:?}", e)))?;

        let new_topic = NewTopic::new(
            &self.topic,
            num_partitions,
            TopicReplication::Fixed(replication_factor),
        );

        match admin_client
            .create_topics(&[new_topic], &AdminOptions::new())
            .await
        {
            Ok(_) => {
                info!("{:<12} --> Kafka 토픽 생성 성공: {}", "Publisher", self.topic);
                Ok(())
            }
            Err(e) => {
                error!("{:<12} --> Kafka 토픽 생성 실패: {:?}", "Publisher", e);
                Err(PublishError::Send(format!("토픽 생성 실패: {:?}", e)))
            }
        }
    }
}

#[async_trait]
impl EventPublisher for KafkaPublisher {
    async fn publish(&self, event: &AuctionEvent) -> Result<(), PublishError> {
        let key = event.auction_id().to_string();
        let payload = serde_json::to_string(event)?;
        info!(
            "{:<12} --> Kafka 메시지 전송: topic={}, key={}",
            "Publisher", self.topic, key
        );
        let record = FutureRecord::to(&self.topic)
            .key(key.as_str())
            .payload(payload.as_str());

        self.producer
            .send(record, Duration::from_secs(0))
            .await
            .map_err(|(e, _)| PublishError::Send(format!("{:?}", e)))?;

        Ok(())
    }
}
// endregion: --- Kafka Publisher
