use crate::models::transaction::{Transaction, TransactionType};
use crate::operations::search::filter_by_month;
use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Balance {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

/// Totals saturate at the `Decimal` bounds instead of overflowing.
pub fn compute_balance<'a, I>(transactions: I) -> Balance
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let (income, expense) = transactions.into_iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(income, expense), transaction| match transaction.transaction_type {
            TransactionType::Income => (income.saturating_add(transaction.amount), expense),
            TransactionType::Expense => (income, expense.saturating_add(transaction.amount)),
        },
    );
    Balance {
        income,
        expense,
        balance: income.saturating_sub(expense),
    }
}

/// Balance of the calendar month containing `reference_date`, or `None` when
/// no transaction falls in that month.
pub fn monthly_report(
    transactions: &[Transaction],
    reference_date: NaiveDate,
) -> Option<Balance> {
    let prefix = reference_date.format("%Y-%m").to_string();
    let monthly = filter_by_month(transactions, Some(&prefix));
    if monthly.is_empty() {
        return None;
    }
    Some(compute_balance(monthly))
}
