use crate::error::{FinanceError, Result};
use crate::operations::add::check_money;
use rust_decimal::Decimal;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitState {
    Unset,
    Ok,
    Near,
    Exceeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitStatus {
    pub percent: Decimal,
    pub state: LimitState,
}

const NEAR_PERCENT: i64 = 80;

pub fn limit_status(total_expense: Decimal, limit: Decimal) -> LimitStatus {
    if limit <= Decimal::ZERO {
        return LimitStatus {
            percent: Decimal::ZERO,
            state: LimitState::Unset,
        };
    }
    // A ratio too large to represent is over the limit either way.
    let Some(percent) = total_expense
        .checked_div(limit)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
    else {
        return LimitStatus {
            percent: Decimal::MAX,
            state: LimitState::Exceeded,
        };
    };
    let state = if percent >= Decimal::ONE_HUNDRED {
        LimitState::Exceeded
    } else if percent >= Decimal::from(NEAR_PERCENT) {
        LimitState::Near
    } else {
        LimitState::Ok
    };
    LimitStatus { percent, state }
}

pub fn parse_limit(raw: &str) -> Result<Decimal> {
    let limit = Decimal::from_str(raw.trim()).map_err(|_| {
        FinanceError::Validation(format!(
            "Invalid expense limit '{}'. Must be a valid number",
            raw.trim()
        ))
    })?;
    check_money(limit, "Expense limit")
}
