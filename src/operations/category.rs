use crate::models::transaction::{Transaction, TransactionType};
use rust_decimal::Decimal;

/// Sum per category for one transaction type, in the order each category
/// first appears.
pub fn group_by_category<'a, I>(
    transactions: I,
    transaction_type: TransactionType,
) -> Vec<(String, Decimal)>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals: Vec<(String, Decimal)> = Vec::new();
    for transaction in transactions
        .into_iter()
        .filter(|t| t.transaction_type == transaction_type)
    {
        match totals.iter_mut().find(|(category, _)| *category == transaction.category) {
            Some((_, sum)) => *sum = sum.saturating_add(transaction.amount),
            None => totals.push((transaction.category.clone(), transaction.amount)),
        }
    }
    totals
}

/// Largest sum first. Equal sums keep first-appearance order.
pub fn sorted_category_totals<'a, I>(
    transactions: I,
    transaction_type: TransactionType,
) -> Vec<(String, Decimal)>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals = group_by_category(transactions, transaction_type);
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals
}
