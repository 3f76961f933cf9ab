use crate::models::transaction::Transaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything stored for one user. An `expense_limit` of zero means no limit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub transactions: Vec<Transaction>,
    pub expense_limit: Decimal,
    pub categories: Vec<String>,
    /// Highest id ever handed out, so ids stay unique after deletes.
    #[serde(default)]
    pub last_id: i64,
    /// Stored entries that could not be read as transactions. They are
    /// written back untouched on save.
    #[serde(skip)]
    pub unreadable: Vec<Value>,
}

impl UserData {
    pub fn remember_category(&mut self, category: &str) {
        if !self.categories.iter().any(|c| c == category) {
            self.categories.push(category.to_string());
        }
    }

    /// Hands out the next id: the clock in milliseconds, or one past the
    /// highest id seen when the clock lags behind it.
    pub fn next_id(&mut self, now_millis: i64) -> i64 {
        let last = self
            .transactions
            .iter()
            .map(|t| t.id)
            .fold(self.last_id, i64::max);
        let id = if last >= now_millis { last + 1 } else { now_millis };
        self.last_id = id;
        id
    }
}
