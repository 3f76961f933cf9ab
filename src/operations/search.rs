use crate::models::transaction::Transaction;

/// Case-insensitive match on the category, or a substring match on the
/// amount as it is displayed (`12.5`, not `12.50`). An empty term keeps all.
pub fn filter_by_search_term<'a, I>(transactions: I, term: &str) -> Vec<&'a Transaction>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let term = term.to_lowercase();
    transactions
        .into_iter()
        .filter(|transaction| {
            transaction.category.to_lowercase().contains(&term)
                || transaction.amount.normalize().to_string().contains(&term)
        })
        .collect()
}

/// Keeps transactions whose ISO date starts with `month_prefix` (`YYYY-MM`).
pub fn filter_by_month<'a, I>(transactions: I, month_prefix: Option<&str>) -> Vec<&'a Transaction>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let transactions = transactions.into_iter();
    match month_prefix {
        Some(prefix) if !prefix.is_empty() => transactions
            .filter(|transaction| transaction.date_string().starts_with(prefix))
            .collect(),
        _ => transactions.collect(),
    }
}
