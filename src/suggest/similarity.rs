//! Cosine similarity and the two ranking policies.
//!
//! With a query vector, candidates are ordered by cosine similarity plus a
//! small bonus for the user's own records. Without one (empty input), the
//! cold-start order is user records first, newest first.

use std::cmp::Ordering;

use super::types::{Chip, EmbeddingRecord, Source};

/// Cosine similarity of two vectors.
///
/// Returns 0.0 when lengths differ or either vector has zero norm, so one
/// malformed record can't poison a ranking pass.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        tracing::debug!(left = a.len(), right = b.len(), "vector dimension mismatch");
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom > 0.0 {
        dot / denom
    } else {
        0.0
    }
}

/// Rank a candidate pool. Every returned chip is tagged `method: embedding`.
pub fn rank<'a, I>(query: Option<&[f32]>, pool: I, user_bonus: f32, limit: usize) -> Vec<Chip>
where
    I: IntoIterator<Item = &'a EmbeddingRecord>,
{
    let ranked = match query {
        Some(q) => rank_by_similarity(q, pool, user_bonus),
        None => rank_cold_start(pool),
    };
    ranked.into_iter().take(limit).map(Chip::from_record).collect()
}

/// Score = cosine + `user_bonus` for user records, descending. Ties keep pool order.
fn rank_by_similarity<'a, I>(query: &[f32], pool: I, user_bonus: f32) -> Vec<&'a EmbeddingRecord>
where
    I: IntoIterator<Item = &'a EmbeddingRecord>,
{
    let mut scored: Vec<(&EmbeddingRecord, f32)> = pool
        .into_iter()
        .map(|record| {
            let bonus = if record.source == Source::User { user_bonus } else { 0.0 };
            (record, cosine_similarity(query, &record.vector) + bonus)
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.into_iter().map(|(record, _)| record).collect()
}

/// User before seed, then newest first.
fn rank_cold_start<'a, I>(pool: I) -> Vec<&'a EmbeddingRecord>
where
    I: IntoIterator<Item = &'a EmbeddingRecord>,
{
    let mut records: Vec<&EmbeddingRecord> = pool.into_iter().collect();
    records.sort_by(|a, b| {
        source_rank(a.source)
            .cmp(&source_rank(b.source))
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    records
}

fn source_rank(source: Source) -> u8 {
    match source {
        Source::User => 0,
        Source::Seed => 1,
    }
}
