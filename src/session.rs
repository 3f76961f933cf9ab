use crate::db::repository::{load_user_data, save_user_data};
use crate::db::store::Store;
use crate::error::{FinanceError, Result};
use crate::models::transaction::{NewTransaction, Transaction, TransactionType};
use crate::models::user::UserData;
use crate::operations::balance::compute_balance;
use crate::operations::import::read_csv;
use crate::operations::limit::parse_limit;
use crate::operations::remove::remove_transaction;
use chrono::Utc;
use rust_decimal::Decimal;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct AddOutcome {
    pub transaction: Transaction,
    /// Set when this expense pushed the running total over the limit.
    pub limit_notice: Option<String>,
}

/// The signed-in user and their data. Every mutation is written to the store
/// before it becomes visible here, so a failed save changes nothing.
pub struct Session<S: Store> {
    store: S,
    current_user: Option<String>,
    data: UserData,
}

impl<S: Store> Session<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            current_user: None,
            data: UserData::default(),
        }
    }

    pub fn current_user(&self) -> Option<&str> {
        self.current_user.as_deref()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.data.transactions
    }

    pub fn categories(&self) -> &[String] {
        &self.data.categories
    }

    pub fn expense_limit(&self) -> Decimal {
        self.data.expense_limit
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let username = username.trim();
        if username.is_empty() || password.trim().is_empty() {
            return Err(FinanceError::Validation("Username and password are required".to_string()));
        }
        if self.current_user.is_some() {
            self.logout()?;
        }

        self.data = load_user_data(&self.store, username)?;
        self.current_user = Some(username.to_string());
        info!(username, transactions = self.data.transactions.len(), "logged in");
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        if let Some(username) = self.current_user.as_deref() {
            save_user_data(&mut self.store, username, &self.data)?;
            info!(username, "logged out");
        }
        self.current_user = None;
        self.data = UserData::default();
        Ok(())
    }

    pub fn add_transaction(&mut self, new: NewTransaction) -> Result<AddOutcome> {
        self.add_at(new, Utc::now().timestamp_millis())
    }

    fn add_at(&mut self, new: NewTransaction, now_millis: i64) -> Result<AddOutcome> {
        self.require_user()?;
        let mut data = self.data.clone();
        let transaction = push_transaction(&mut data, new, now_millis);
        self.commit(data)?;

        let limit_notice = self.limit_breach(&transaction);
        if limit_notice.is_some() {
            warn!(id = transaction.id, limit = %self.data.expense_limit, "expense limit exceeded");
        }
        Ok(AddOutcome {
            transaction,
            limit_notice,
        })
    }

    pub fn delete_transaction(&mut self, id: i64) -> Result<Transaction> {
        self.require_user()?;
        let mut data = self.data.clone();
        let removed = remove_transaction(&mut data.transactions, id)?;
        self.commit(data)?;
        info!(id, "transaction removed");
        Ok(removed)
    }

    pub fn clear_all(&mut self) -> Result<usize> {
        self.require_user()?;
        let mut data = self.data.clone();
        let removed = data.transactions.len();
        data.transactions.clear();
        self.commit(data)?;
        info!(removed, "all transactions cleared");
        Ok(removed)
    }

    pub fn set_expense_limit(&mut self, raw: &str) -> Result<Decimal> {
        self.require_user()?;
        let limit = parse_limit(raw)?;
        let mut data = self.data.clone();
        data.expense_limit = limit;
        self.commit(data)?;
        Ok(limit)
    }

    /// Adds every row of the file, or none of them.
    pub fn import_csv(&mut self, path: &Path) -> Result<usize> {
        self.require_user()?;
        let rows = read_csv(path)?;
        let mut data = self.data.clone();
        let now = Utc::now().timestamp_millis();
        for row in rows.iter().cloned() {
            push_transaction(&mut data, row, now);
        }
        self.commit(data)?;
        info!(imported = rows.len(), path = %path.display(), "imported transactions");
        Ok(rows.len())
    }

    fn require_user(&self) -> Result<&str> {
        self.current_user.as_deref().ok_or(FinanceError::NotLoggedIn)
    }

    fn commit(&mut self, data: UserData) -> Result<()> {
        let username = self.require_user()?.to_string();
        save_user_data(&mut self.store, &username, &data)?;
        self.data = data;
        Ok(())
    }

    fn limit_breach(&self, transaction: &Transaction) -> Option<String> {
        let limit = self.data.expense_limit;
        if transaction.transaction_type != TransactionType::Expense || limit <= Decimal::ZERO {
            return None;
        }
        let total = compute_balance(&self.data.transactions).expense;
        (total > limit).then(|| format!("Expense limit exceeded: spent {} of {}", total, limit))
    }
}

fn push_transaction(data: &mut UserData, new: NewTransaction, now_millis: i64) -> Transaction {
    let id = data.next_id(now_millis);
    data.remember_category(&new.category);
    let transaction = new.into_transaction(id);
    data.transactions.push(transaction.clone());
    transaction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::load_user_data;
    use crate::db::store::MemoryStore;
    use crate::operations::add::create_transaction;
    use std::io::Write;
    use std::str::FromStr;
    use tempfile::NamedTempFile;

    /// Memory store whose saves can be switched to fail.
    struct FlakyStore {
        inner: MemoryStore,
        fail_saves: bool,
    }

    impl Store for FlakyStore {
        fn load(&self, username: &str) -> Result<Option<String>> {
            self.inner.load(username)
        }

        fn save(&mut self, username: &str, blob: &str) -> Result<()> {
            if self.fail_saves {
                return Err(FinanceError::Store(rusqlite::Error::InvalidQuery));
            }
            self.inner.save(username, blob)
        }
    }

    /// Alice with two expenses and a limit, after which every save fails.
    fn failing_session() -> Session<FlakyStore> {
        let mut session = Session::new(FlakyStore {
            inner: MemoryStore::new(),
            fail_saves: false,
        });
        session.login("alice", "secret").unwrap();
        session.set_expense_limit("100").unwrap();
        session.add_at(new_tx("2024-03-01, 10, expense, Food"), 1).unwrap();
        session.add_at(new_tx("2024-03-02, 20, expense, Rent"), 2).unwrap();
        session.store.fail_saves = true;
        session
    }

    fn assert_store_error<T: std::fmt::Debug>(result: Result<T>) {
        assert!(matches!(result, Err(FinanceError::Store(_))), "got {:?}", result);
    }

    fn logged_in() -> Session<MemoryStore> {
        let mut session = Session::new(MemoryStore::new());
        session.login("alice", "secret").unwrap();
        session
    }

    fn new_tx(details: &str) -> NewTransaction {
        create_transaction(details).unwrap()
    }

    #[test]
    fn test_login_requires_username_and_password() {
        let mut session = Session::new(MemoryStore::new());
        assert!(matches!(session.login("", "secret"), Err(FinanceError::Validation(_))));
        assert!(matches!(session.login("alice", "  "), Err(FinanceError::Validation(_))));
        assert_eq!(session.current_user(), None);
    }

    #[test]
    fn test_add_without_user_is_rejected() {
        let mut session = Session::new(MemoryStore::new());
        let result = session.add_transaction(new_tx("2024-03-01, 10, expense, Food"));
        assert!(matches!(result, Err(FinanceError::NotLoggedIn)));
        assert!(session.transactions().is_empty());
    }

    #[test]
    fn test_add_is_counted_exactly_once() {
        let mut session = logged_in();
        session.add_transaction(new_tx("2024-03-01, 100, income, Salary")).unwrap();
        session.add_transaction(new_tx("2024-03-02, 30.25, expense, Food")).unwrap();
        let balance = compute_balance(session.transactions());
        assert_eq!(balance.income, Decimal::from(100));
        assert_eq!(balance.expense, Decimal::from_str("30.25").unwrap());
        assert_eq!(session.transactions().len(), 2);
    }

    #[test]
    fn test_add_assigns_increasing_ids() {
        let mut session = logged_in();
        let first = session.add_at(new_tx("2024-03-01, 1, expense, Food"), 1000).unwrap();
        let second = session.add_at(new_tx("2024-03-01, 1, expense, Food"), 1000).unwrap();
        assert_eq!(first.transaction.id, 1000);
        assert_eq!(second.transaction.id, 1001);
    }

    #[test]
    fn test_add_records_category_once() {
        let mut session = logged_in();
        session.add_transaction(new_tx("2024-03-01, 1, expense, Food")).unwrap();
        session.add_transaction(new_tx("2024-03-02, 1, expense, Food")).unwrap();
        session.add_transaction(new_tx("2024-03-03, 1, income, Gift")).unwrap();
        assert_eq!(session.categories(), ["Food".to_string(), "Gift".to_string()]);
    }

    #[test]
    fn test_add_persists_immediately() {
        let mut session = logged_in();
        session.add_transaction(new_tx("2024-03-01, 5, expense, Food")).unwrap();
        let stored = load_user_data(&session.store, "alice").unwrap();
        assert_eq!(stored.transactions.len(), 1);
    }

    #[test]
    fn test_limit_notice_only_when_exceeded() {
        let mut session = logged_in();
        session.set_expense_limit("100").unwrap();
        let at_limit = session.add_transaction(new_tx("2024-03-01, 100, expense, Rent")).unwrap();
        assert_eq!(at_limit.limit_notice, None);
        let over = session.add_transaction(new_tx("2024-03-02, 0.01, expense, Food")).unwrap();
        assert!(over.limit_notice.unwrap().contains("Expense limit exceeded"));
        let income = session.add_transaction(new_tx("2024-03-03, 50, income, Gift")).unwrap();
        assert_eq!(income.limit_notice, None);
    }

    #[test]
    fn test_no_notice_without_limit() {
        let mut session = logged_in();
        let outcome = session.add_transaction(new_tx("2024-03-01, 10000, expense, Car")).unwrap();
        assert_eq!(outcome.limit_notice, None);
    }

    #[test]
    fn test_delete_removes_only_matching_id() {
        let mut session = logged_in();
        let a = session.add_at(new_tx("2024-03-01, 3.5, expense, Coffee"), 1).unwrap();
        let b = session.add_at(new_tx("2024-03-01, 3.5, expense, Coffee"), 2).unwrap();
        session.delete_transaction(a.transaction.id).unwrap();
        assert_eq!(session.transactions().len(), 1);
        assert_eq!(session.transactions()[0].id, b.transaction.id);
        assert!(matches!(
            session.delete_transaction(a.transaction.id),
            Err(FinanceError::NotFound(1))
        ));
    }

    #[test]
    fn test_clear_all_keeps_limit_and_categories() {
        let mut session = logged_in();
        session.set_expense_limit("500").unwrap();
        session.add_transaction(new_tx("2024-03-01, 1, expense, Food")).unwrap();
        session.add_transaction(new_tx("2024-03-02, 1, expense, Rent")).unwrap();
        assert_eq!(session.clear_all().unwrap(), 2);
        assert!(session.transactions().is_empty());
        assert_eq!(session.expense_limit(), Decimal::from(500));
        assert_eq!(session.categories().len(), 2);
    }

    #[test]
    fn test_set_limit_validation_leaves_state() {
        let mut session = logged_in();
        session.set_expense_limit("250").unwrap();
        assert!(session.set_expense_limit("-1").is_err());
        assert!(session.set_expense_limit("abc").is_err());
        assert_eq!(session.expense_limit(), Decimal::from(250));
    }

    #[test]
    fn test_set_limit_requires_user() {
        let mut session = Session::new(MemoryStore::new());
        assert!(matches!(session.set_expense_limit("10"), Err(FinanceError::NotLoggedIn)));
    }

    #[test]
    fn test_switching_users_replaces_collection() {
        let mut session = logged_in();
        session.add_transaction(new_tx("2024-03-01, 1, expense, Food")).unwrap();
        session.login("bob", "pw").unwrap();
        assert_eq!(session.current_user(), Some("bob"));
        assert!(session.transactions().is_empty());
        session.login("alice", "secret").unwrap();
        assert_eq!(session.transactions().len(), 1);
    }

    #[test]
    fn test_logout_clears_session() {
        let mut session = logged_in();
        session.add_transaction(new_tx("2024-03-01, 1, expense, Food")).unwrap();
        session.logout().unwrap();
        assert_eq!(session.current_user(), None);
        assert!(session.transactions().is_empty());
        assert_eq!(session.expense_limit(), Decimal::ZERO);
    }

    #[test]
    fn test_failed_save_on_add_changes_nothing() {
        let mut session = failing_session();
        let before = session.data.clone();
        assert_store_error(session.add_transaction(new_tx("2024-03-03, 1, income, Gift")));
        assert_eq!(session.data, before);
        assert!(!session.categories().contains(&"Gift".to_string()));
    }

    #[test]
    fn test_failed_save_on_delete_changes_nothing() {
        let mut session = failing_session();
        let before = session.data.clone();
        assert_store_error(session.delete_transaction(1));
        assert_eq!(session.data, before);
        assert_eq!(session.transactions().len(), 2);
    }

    #[test]
    fn test_failed_save_on_clear_changes_nothing() {
        let mut session = failing_session();
        let before = session.data.clone();
        assert_store_error(session.clear_all());
        assert_eq!(session.data, before);
    }

    #[test]
    fn test_failed_save_on_set_limit_changes_nothing() {
        let mut session = failing_session();
        assert_store_error(session.set_expense_limit("900"));
        assert_eq!(session.expense_limit(), Decimal::from(100));
    }

    #[test]
    fn test_failed_save_on_import_changes_nothing() {
        let mut session = failing_session();
        let before = session.data.clone();
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "2025-11-10,1500.00,income,Job\n").unwrap();
        assert_store_error(session.import_csv(tmp.path()));
        assert_eq!(session.data, before);
    }

    #[test]
    fn test_failed_save_on_logout_keeps_session() {
        let mut session = failing_session();
        let before = session.data.clone();
        assert_store_error(session.logout());
        assert_eq!(session.current_user(), Some("alice"));
        assert_eq!(session.data, before);
    }

    #[test]
    fn test_failed_save_on_user_switch_keeps_previous_user() {
        let mut session = failing_session();
        let before = session.data.clone();
        assert_store_error(session.login("bob", "pw"));
        assert_eq!(session.current_user(), Some("alice"));
        assert_eq!(session.data, before);

        session.store.fail_saves = false;
        session.login("bob", "pw").unwrap();
        assert_eq!(session.current_user(), Some("bob"));
    }

    #[test]
    fn test_add_keeps_unreadable_stored_entries() {
        let store = MemoryStore::with_blob(
            "alice",
            r#"{"transactions":[
                {"id":1,"type":"expense","amount":2,"category":"Food","date":"2024-03-01"},
                {"id":2,"type":"expense","amount":2,"category":"Food","date":"yesterday"}
            ]}"#,
        );
        let mut session = Session::new(store);
        session.login("alice", "secret").unwrap();
        assert_eq!(session.transactions().len(), 1);

        let added = session.add_at(new_tx("2024-03-05, 4, expense, Food"), 2).unwrap();
        assert_eq!(added.transaction.id, 3);

        let blob = session.store.load("alice").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
        let ids: Vec<i64> = value["transactions"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|item| item["id"].as_i64())
            .collect();
        assert_eq!(ids, vec![1, 3, 2]);

        session.logout().unwrap();
        session.login("alice", "secret").unwrap();
        assert_eq!(session.transactions().len(), 2);
    }

    #[test]
    fn test_ids_not_reused_after_deleting_newest() {
        let mut session = logged_in();
        session.add_at(new_tx("2024-03-01, 1, expense, Food"), 500).unwrap();
        let newest = session.add_at(new_tx("2024-03-01, 1, expense, Food"), 900).unwrap();
        session.delete_transaction(newest.transaction.id).unwrap();

        session.logout().unwrap();
        session.login("alice", "secret").unwrap();
        let next = session.add_at(new_tx("2024-03-02, 1, expense, Food"), 600).unwrap();
        assert_eq!(next.transaction.id, 901);

        session.clear_all().unwrap();
        let after_clear = session.add_at(new_tx("2024-03-03, 1, expense, Food"), 600).unwrap();
        assert_eq!(after_clear.transaction.id, 902);
    }

    #[test]
    fn test_add_with_huge_stored_expenses_does_not_panic() {
        let max = Decimal::MAX.to_string();
        let store = MemoryStore::with_blob(
            "alice",
            &format!(
                r#"{{"transactions":[
                    {{"id":1,"type":"expense","amount":"{max}","category":"Food","date":"2024-03-01"}},
                    {{"id":2,"type":"expense","amount":"{max}","category":"Food","date":"2024-03-02"}}
                ],"expenseLimit":"100"}}"#
            ),
        );
        let mut session = Session::new(store);
        session.login("alice", "secret").unwrap();
        let outcome = session.add_at(new_tx("2024-03-03, 1, expense, Food"), 10).unwrap();
        assert!(outcome.limit_notice.is_some());
        assert_eq!(compute_balance(session.transactions()).expense, Decimal::MAX);
    }

    #[test]
    fn test_set_limit_rejects_sub_cent_limit() {
        let mut session = logged_in();
        assert!(matches!(
            session.set_expense_limit("0.0000000000000000000000000001"),
            Err(FinanceError::Validation(_))
        ));
        assert_eq!(session.expense_limit(), Decimal::ZERO);
    }

    #[test]
    fn test_import_csv_adds_all_rows() {
        let mut session = logged_in();
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "2025-11-10,1500.00,income,Job\n2025-11-11,3.50,expense,Food\n").unwrap();
        assert_eq!(session.import_csv(tmp.path()).unwrap(), 2);
        let ids: Vec<i64> = session.transactions().iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids[1] > ids[0]);
    }

    #[test]
    fn test_import_csv_failure_adds_nothing() {
        let mut session = logged_in();
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "2025-11-10,1500.00,income,Job\nbad,3.50,expense,Food\n").unwrap();
        assert!(session.import_csv(tmp.path()).is_err());
        assert!(session.transactions().is_empty());
    }
}
