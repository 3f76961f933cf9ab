use crate::error::{FinanceError, Result};
use crate::models::transaction::Transaction;

pub fn parse_transaction_id(id_input: &str) -> Result<i64> {
    let id_input = id_input.trim();
    if id_input.is_empty() {
        return Err(FinanceError::Validation("Transaction ID cannot be empty.".to_string()));
    }
    id_input.parse::<i64>().map_err(|_| {
        FinanceError::Validation(
            "Invalid transaction ID format. Please provide a number.".to_string(),
        )
    })
}

/// Removes the single transaction with `id`; every other entry is kept.
pub fn remove_transaction(transactions: &mut Vec<Transaction>, id: i64) -> Result<Transaction> {
    match transactions.iter().position(|t| t.id == id) {
        Some(pos) => Ok(transactions.remove(pos)),
        None => Err(FinanceError::NotFound(id)),
    }
}
