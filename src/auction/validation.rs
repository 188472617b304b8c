// region:    --- Imports
use super::model::{Amount, Auction, AuctionDraft, AuctionPatch};
use crate::error::{AuctionError, ValidationErrors};
use chrono::{DateTime, Utc};

// endregion: --- Imports

// region:    --- Field Rules
fn check_required(errors: &mut ValidationErrors, field: &'static str, value: &str, message: &'static str) {
    if value.trim().is_empty() {
        errors.reject(field, "field.required", message);
    }
}

fn check_buy_now_price(errors: &mut ValidationErrors, buy_now_price: Amount, starting_price: Amount) {
    if buy_now_price <= 0 {
        errors.reject(
            "buyNowPrice",
            "field.invalid",
            "Buy Now price must be a positive number",
        );
    }
    if buy_now_price <= starting_price {
        errors.reject(
            "buyNowPrice",
            "field.invalid",
            "Buy Now price must be greater than Starting price",
        );
    }
}

fn check_end_time(errors: &mut ValidationErrors, end_time: DateTime<Utc>, now: DateTime<Utc>) {
    if end_time <= now {
        errors.reject("endTime", "field.invalid", "End time must be in the future");
    }
}
// endregion: --- Field Rules

// region:    --- Validators
/// 경매 생성 검증 (위반된 필드를 모두 수집)
pub fn validate_draft(draft: &AuctionDraft, now: DateTime<Utc>) -> Result<(), AuctionError> {
    let mut errors = ValidationErrors::new();

    check_required(&mut errors, "title", &draft.title, "Title is required");
    check_required(
        &mut errors,
        "description",
        &draft.description,
        "Description is required",
    );
    if draft.starting_price <= 0 {
        errors.reject(
            "startingPrice",
            "field.invalid",
            "Starting price must be a positive number",
        );
    }
    check_buy_now_price(&mut errors, draft.buy_now_price, draft.starting_price);
    check_end_time(&mut errors, draft.end_time, now);
    check_required(&mut errors, "category", &draft.category, "Category is required");

    errors.into_result()
}

/// 경매 수정 검증
/// 변경되는 필드만 다시 검사한다. 즉시 구매가는 기존 시작가와 비교.
pub fn validate_patch(
    patch: &AuctionPatch,
    current: &Auction,
    now: DateTime<Utc>,
) -> Result<(), AuctionError> {
    let mut errors = ValidationErrors::new();

    if let Some(title) = &patch.title {
        check_required(&mut errors, "title", title, "Title is required");
    }
    if let Some(description) = &patch.description {
        check_required(&mut errors, "description", description, "Description is required");
    }
    if let Some(buy_now_price) = patch.buy_now_price {
        check_buy_now_price(&mut errors, buy_now_price, current.starting_price);
    }
    if let Some(category) = &patch.category {
        check_required(&mut errors, "category", category, "Category is required");
    }
    if let Some(end_time) = patch.end_time {
        check_end_time(&mut errors, end_time, now);
    }

    errors.into_result()
}
// endregion: --- Validators
