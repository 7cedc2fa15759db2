//! String-closeness fallback used when embeddings are unavailable.

use std::cmp::Ordering;

/// Rank `pool` against `query` without embeddings.
///
/// No query: the first `limit` items in pool order. With a query, an item
/// that contains it (case-insensitive) scores 2; anything else scores
/// `1 / (1 + |len(item) - len(query)|)`. Ties keep pool order.
pub fn fuzzy_rank<S: AsRef<str>>(pool: &[S], query: Option<&str>, limit: usize) -> Vec<String> {
    let query = match query.filter(|q| !q.is_empty()) {
        Some(q) => q.to_lowercase(),
        None => {
            return pool
                .iter()
                .take(limit)
                .map(|item| item.as_ref().to_string())
                .collect()
        }
    };
    let query_len = query.chars().count() as f64;

    let mut scored: Vec<(&str, f64)> = pool
        .iter()
        .map(|item| {
            let item = item.as_ref();
            let score = if item.to_lowercase().contains(&query) {
                2.0
            } else {
                let diff = (item.chars().count() as f64 - query_len).abs();
                1.0 / (1.0 + diff)
            };
            (item, score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored
        .into_iter()
        .take(limit)
        .map(|(item, _)| item.to_string())
        .collect()
}
