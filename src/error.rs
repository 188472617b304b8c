// region:    --- Imports
use crate::auction::model::{Amount, AuctionId};
use crate::store::StoreError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

// endregion: --- Imports

// region:    --- Validation Errors
/// 단일 필드 검증 오류
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub code: &'static str,
    pub message: &'static str,
}

/// 검증 오류 모음
/// 첫 번째 오류에서 멈추지 않고 위반된 모든 필드를 모은다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(&mut self, field: &'static str, code: &'static str, message: &'static str) {
        self.errors.push(FieldError {
            field,
            code,
            message,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// 오류가 없으면 Ok, 있으면 AuctionError::Validation
    pub fn into_result(self) -> Result<(), AuctionError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AuctionError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "[{}]", fields.join(", "))
    }
}
// endregion: --- Validation Errors

// region:    --- Auction Error
/// 경매 코어 오류
/// 요청 경계에서 모두 복구 가능하며, 호출 측이 사용자 메시지로 변환한다.
#[derive(Debug, Error)]
pub enum AuctionError {
    #[error("잘못된 입력입니다: {0}")]
    Validation(ValidationErrors),

    #[error("진행 중인 경매가 아닙니다: {0}")]
    NotActive(AuctionId),

    #[error("입찰 금액이 너무 낮습니다: {amount} (최소 {minimum})")]
    BidTooLow { amount: Amount, minimum: Amount },

    #[error("해당 경매를 변경할 권한이 없습니다: {0}")]
    Permission(AuctionId),

    #[error("입찰이 있는 경매는 삭제할 수 없습니다: {0}")]
    HasBids(AuctionId),

    #[error("{entity}을(를) 찾을 수 없습니다: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("최대 재시도 횟수 초과: {0}")]
    RetriesExhausted(AuctionId),

    #[error("이미 사용 중인 로그인입니다")]
    LoginTaken,

    #[error("로그인 정보가 올바르지 않습니다")]
    InvalidCredentials,

    #[error("저장소 오류: {0}")]
    Store(#[source] StoreError),
}

impl From<StoreError> for AuctionError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => AuctionError::auction_not_found(id),
            StoreError::LoginTaken(_) => AuctionError::LoginTaken,
            e => AuctionError::Store(e),
        }
    }
}

impl AuctionError {
    pub fn auction_not_found(id: AuctionId) -> Self {
        AuctionError::NotFound {
            entity: "경매",
            id,
        }
    }

    /// 호출 측 응답에 사용할 오류 코드
    pub fn code(&self) -> &'static str {
        match self {
            AuctionError::Validation(_) => "VALIDATION",
            AuctionError::NotActive(_) => "NOT_ACTIVE",
            AuctionError::BidTooLow { .. } => "LOW_BID",
            AuctionError::Permission(_) => "PERMISSION_DENIED",
            AuctionError::HasBids(_) => "HAS_BIDS",
            AuctionError::NotFound { .. } => "NOT_FOUND",
            AuctionError::RetriesExhausted(_) => "MAX_RETRIES_EXCEEDED",
            AuctionError::LoginTaken => "LOGIN_TAKEN",
            AuctionError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuctionError::Store(_) => "STORE",
        }
    }
}
// endregion: --- Auction Error
