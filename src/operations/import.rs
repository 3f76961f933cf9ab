use super::add::validate_transaction;
use crate::error::{FinanceError, Result};
use crate::models::transaction::NewTransaction;
use std::fs::File;
use std::path::Path;

/// Reads `date,amount,type,category` rows without a header. Any invalid row
/// fails the whole import.
pub fn read_csv(path: &Path) -> Result<Vec<NewTransaction>> {
    let file = File::open(path).map_err(|e| {
        FinanceError::Validation(format!("Failed to open file '{}': {}", path.display(), e))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut transactions = Vec::new();

    for (line_index, result) in reader.records().enumerate() {
        let line = line_index + 1;
        let record = result?;

        if record.len() != 4 {
            return Err(FinanceError::Import {
                line,
                message: format!("Invalid number of columns: expected 4, got {}", record.len()),
            });
        }

        let date = record.get(0).unwrap_or("");
        let amount = record.get(1).unwrap_or("");
        let transaction_type = record.get(2).unwrap_or("");
        let category = record.get(3).unwrap_or("");

        let transaction = validate_transaction(date, amount, transaction_type, category)
            .map_err(|e| FinanceError::Import {
                line,
                message: e.to_string(),
            })?;

        transactions.push(transaction);
    }

    Ok(transactions)
}
