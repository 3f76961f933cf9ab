use crate::db::store::Store;
use crate::error::Result;
use crate::models::transaction::Transaction;
use crate::models::user::UserData;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, warn};

/// Loads a user's data, accepting both the current object layout and the
/// older bare transaction array. Unreadable documents fall back to defaults;
/// unreadable transactions are kept aside and written back on the next save.
pub fn load_user_data<S: Store>(store: &S, username: &str) -> Result<UserData> {
    let Some(blob) = store.load(username)? else {
        debug!(username, "no stored data, starting empty");
        return Ok(UserData::default());
    };

    let value: Value = match serde_json::from_str(&blob) {
        Ok(value) => value,
        Err(e) => {
            warn!(username, error = %e, "stored data is not valid JSON, starting empty");
            return Ok(UserData::default());
        }
    };

    let mut data = match value {
        Value::Array(items) => {
            warn!(username, "migrating legacy transaction list");
            let (transactions, unreadable) = parse_transactions(username, items);
            let mut data = UserData::default();
            for transaction in &transactions {
                data.remember_category(&transaction.category);
            }
            data.transactions = transactions;
            data.unreadable = unreadable;
            data
        }
        Value::Object(mut fields) => {
            let (transactions, unreadable) = match fields.remove("transactions") {
                Some(Value::Array(items)) => parse_transactions(username, items),
                _ => (Vec::new(), Vec::new()),
            };
            UserData {
                transactions,
                expense_limit: fields
                    .remove("expenseLimit")
                    .map(parse_limit)
                    .unwrap_or_default(),
                categories: match fields.remove("categories") {
                    Some(Value::Array(items)) => items
                        .into_iter()
                        .filter_map(|item| match item {
                            Value::String(c) if !c.trim().is_empty() => Some(c),
                            _ => None,
                        })
                        .collect(),
                    _ => Vec::new(),
                },
                last_id: fields
                    .get("lastId")
                    .and_then(Value::as_i64)
                    .unwrap_or_default(),
                unreadable,
            }
        }
        _ => {
            warn!(username, "stored data has an unexpected shape, starting empty");
            UserData::default()
        }
    };

    // kept entries may still carry an id worth reserving
    data.last_id = data
        .unreadable
        .iter()
        .filter_map(|item| item.get("id").and_then(Value::as_i64))
        .fold(data.last_id, i64::max);

    debug!(
        username,
        transactions = data.transactions.len(),
        unreadable = data.unreadable.len(),
        "loaded user data"
    );
    Ok(data)
}

pub fn save_user_data<S: Store>(store: &mut S, username: &str, data: &UserData) -> Result<()> {
    let mut value = serde_json::to_value(data)?;
    if let Some(Value::Array(items)) = value.get_mut("transactions") {
        items.extend(data.unreadable.iter().cloned());
    }
    let blob = serde_json::to_string(&value)?;
    store.save(username, &blob)?;
    debug!(username, transactions = data.transactions.len(), "saved user data");
    Ok(())
}

/// Splits stored entries into readable transactions and the raw values that
/// could not be read.
fn parse_transactions(username: &str, items: Vec<Value>) -> (Vec<Transaction>, Vec<Value>) {
    let mut transactions = Vec::new();
    let mut unreadable = Vec::new();
    for item in items {
        match serde_json::from_value::<Transaction>(item.clone()) {
            Ok(mut transaction) => {
                transaction.category = transaction.category.trim().to_string();
                if transaction.category.is_empty() {
                    let id = transaction.id;
                    warn!(username, id, "keeping transaction without category aside");
                    unreadable.push(item);
                } else {
                    transactions.push(transaction);
                }
            }
            Err(e) => {
                warn!(username, error = %e, "keeping malformed transaction aside");
                unreadable.push(item);
            }
        }
    }
    (transactions, unreadable)
}

fn parse_limit(value: Value) -> Decimal {
    serde_json::from_value::<Decimal>(value)
        .ok()
        .filter(|limit| *limit >= Decimal::ZERO)
        .unwrap_or_default()
}
