use crate::error::{FinanceError, Result};
use crate::models::transaction::{NewTransaction, TransactionType};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Largest amount or expense limit accepted from input.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Amounts and limits are kept to cents.
pub const MAX_DECIMAL_PLACES: u32 = 2;

/// Parses `date(YYYY-MM-DD), amount, type(income/expense), category`.
pub fn create_transaction(details: &str) -> Result<NewTransaction> {
    let detail_parts: Vec<&str> = details.split(',').map(|s| s.trim()).collect();
    if detail_parts.len() != 4 {
        return Err(FinanceError::Validation(format!(
            "Invalid number of details provided. Expected 4 details separated by commas but got {}",
            detail_parts.len()
        )));
    }
    validate_transaction(detail_parts[0], detail_parts[1], detail_parts[2], detail_parts[3])
}

pub fn validate_transaction(
    date: &str,
    amount: &str,
    transaction_type: &str,
    category: &str,
) -> Result<NewTransaction> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
        FinanceError::Validation("Invalid date format. Please use YYYY-MM-DD.".to_string())
    })?;

    let amount = amount.trim().parse::<Decimal>().map_err(|_| {
        FinanceError::Validation(format!(
            "Invalid amount format {}. Please provide a valid decimal number.",
            amount.trim()
        ))
    })?;
    let amount = check_money(amount, "Amount")?;

    let transaction_type = TransactionType::parse(transaction_type).ok_or_else(|| {
        FinanceError::Validation("Invalid transaction type. Use 'income' or 'expense'.".to_string())
    })?;

    // Check category to be present and have max 50 characters
    let category = category.trim();
    if category.is_empty() {
        return Err(FinanceError::Validation("Category cannot be empty".to_string()));
    }
    if category.chars().count() > 50 {
        return Err(FinanceError::Validation("Category too long".to_string()));
    }

    Ok(NewTransaction {
        transaction_type,
        amount,
        category: category.to_string(),
        date,
    })
}

/// Rejects negative values, values above [`MAX_AMOUNT`] and fractions finer
/// than a cent. `what` names the value in the error message.
pub fn check_money(value: Decimal, what: &str) -> Result<Decimal> {
    if value < Decimal::ZERO {
        return Err(FinanceError::Validation(format!("{} cannot be negative", what)));
    }
    if value > Decimal::from(MAX_AMOUNT) {
        return Err(FinanceError::Validation(format!("{} cannot exceed {}", what, MAX_AMOUNT)));
    }
    if value.normalize().scale() > MAX_DECIMAL_PLACES {
        return Err(FinanceError::Validation(format!(
            "{} can have at most {} decimal places",
            what, MAX_DECIMAL_PLACES
        )));
    }
    Ok(value)
}
