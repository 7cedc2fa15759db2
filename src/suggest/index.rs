//! In-memory candidate pool, rebuilt every session.
//!
//! Seeds are keyed by their deterministic id so a re-embedded seed replaces
//! the old one. User records are kept in arrival order and only ever appended.

use std::collections::HashMap;

use super::similarity;
use super::types::{Chip, Domain, EmbeddingRecord, Source};

#[derive(Debug, Default)]
pub struct SimilarityIndex {
    seeds: HashMap<Domain, Vec<EmbeddingRecord>>,
    users: HashMap<Domain, Vec<EmbeddingRecord>>,
}

impl SimilarityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from stored records, routing each by its source.
    pub fn from_records(records: impl IntoIterator<Item = EmbeddingRecord>) -> Self {
        let mut index = Self::new();
        for record in records {
            index.insert(record);
        }
        index
    }

    pub fn insert(&mut self, record: EmbeddingRecord) {
        match record.source {
            Source::Seed => {
                let seeds = self.seeds.entry(record.domain).or_default();
                match seeds.iter_mut().find(|s| s.id == record.id) {
                    Some(existing) => *existing = record,
                    None => seeds.push(record),
                }
            }
            Source::User => self.users.entry(record.domain).or_default().push(record),
        }
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = EmbeddingRecord>) {
        for record in records {
            self.insert(record);
        }
    }

    /// Seed records followed by user records for `domain`.
    pub fn pool(&self, domain: Domain) -> impl Iterator<Item = &EmbeddingRecord> {
        self.seeds
            .get(&domain)
            .into_iter()
            .flatten()
            .chain(self.users.get(&domain).into_iter().flatten())
    }

    pub fn pool_len(&self, domain: Domain) -> usize {
        self.seeds.get(&domain).map_or(0, Vec::len) + self.users.get(&domain).map_or(0, Vec::len)
    }

    pub fn seed_count(&self) -> usize {
        self.seeds.values().map(Vec::len).sum()
    }

    pub fn user_count(&self) -> usize {
        self.users.values().map(Vec::len).sum()
    }

    /// Rank the pool for `domain`; `None` uses the cold-start order.
    pub fn rank(
        &self,
        domain: Domain,
        query: Option<&[f32]>,
        user_bonus: f32,
        limit: usize,
    ) -> Vec<Chip> {
        similarity::rank(query, self.pool(domain), user_bonus, limit)
    }
}
