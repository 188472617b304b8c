/// 환경 변수 기반 설정
// region:    --- Imports
use std::env;
use std::str::FromStr;
use thiserror::Error;
use tokio::time::Duration;

// endregion: --- Imports

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
const DEFAULT_KAFKA_TOPIC: &str = "auction-events";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("잘못된 설정 값 {key}={value}")]
    InvalidValue { key: &'static str, value: String },
}

/// PostgreSQL 연결 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// 시작 시 테이블 삭제 후 재생성
    pub reset: bool,
}

/// Kafka 발행 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaConfig {
    pub brokers: String,
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// None 이면 인메모리 저장소 사용
    pub database: Option<DatabaseConfig>,
    pub sweep_interval: Duration,
    pub seed_sample_data: bool,
    pub kafka: Option<KafkaConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 키 조회 함수로부터 설정 생성
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database = match value("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(
                    "DATABASE_MAX_CONNECTIONS",
                    value("DATABASE_MAX_CONNECTIONS"),
                    DEFAULT_MAX_CONNECTIONS,
                )?,
                reset: parse_flag("DATABASE_RESET", value("DATABASE_RESET"))?,
            }),
            None => None,
        };

        let sweep_secs = parse_or(
            "SWEEP_INTERVAL_SECS",
            value("SWEEP_INTERVAL_SECS"),
            DEFAULT_SWEEP_INTERVAL_SECS,
        )?;
        if sweep_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "SWEEP_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }

        let kafka = value("KAFKA_BROKERS").map(|brokers| KafkaConfig {
            brokers,
            topic: value("KAFKA_TOPIC").unwrap_or_else(|| DEFAULT_KAFKA_TOPIC.to_string()),
        });

        Ok(Self {
            database,
            sweep_interval: Duration::from_secs(sweep_secs),
            seed_sample_data: parse_flag("SEED_SAMPLE_DATA", value("SEED_SAMPLE_DATA"))?,
            kafka,
        })
    }
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(default),
    }
}

fn parse_flag(key: &'static str, raw: Option<String>) -> Result<bool, ConfigError> {
    let Some(raw) = raw else {
        return Ok(false);
    };
    match raw.to_ascii_lowercase().as_str() {
        "0" | "false" | "no" => Ok(false),
        "1" | "true" | "yes" => Ok(true),
        _ => Err(ConfigError::InvalidValue { key, value: raw }),
    }
}
