use crate::models::transaction::Transaction;

/// Most recent first. Transactions on the same day are ordered by descending
/// id, so the one entered last comes first.
pub fn sort_by_date_descending<'a, I>(transactions: I) -> Vec<&'a Transaction>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut sorted: Vec<&Transaction> = transactions.into_iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
    sorted
}
