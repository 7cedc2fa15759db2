//! Built-in seed vocabulary and the routine that embeds it.

use std::collections::HashSet;

use crate::embedding::EmbeddingProvider;

use super::store::EmbeddingStore;
use super::types::{seed_id, Domain, EmbeddingRecord, NewEmbedding};

const NEEDS: &[&str] = &[
    "rest", "warmth", "water", "quiet", "softness", "permission", "time", "support", "light",
    "breath",
];

const TRAITS: &[&str] = &[
    "steady", "curious", "clear", "tender", "focused", "playful", "patient", "bold", "gentle",
    "grounded",
];

const CONTEXTS: &[&str] = &[
    "kitchen cleanup",
    "morning light",
    "desk reset",
    "walk outside",
    "tea ritual",
    "soft clothes",
    "open window",
];

const FRICTIONS: &[&str] = &["scrolling", "overcommit", "clutter", "late nights", "self-critique"];

/// Seed phrases for a domain, in display order.
pub fn seed_texts(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::Needs => NEEDS,
        Domain::Traits => TRAITS,
        Domain::Contexts => CONTEXTS,
        Domain::Frictions => FRICTIONS,
    }
}

/// Embed and persist the seed phrases of `domain` that aren't in `known_ids`.
///
/// Failures are per item: a phrase that can't be embedded is skipped, and
/// one that can't be saved is still returned so this session can use it.
/// Records are saved under [`seed_id`], so running this twice never
/// produces a second record for the same phrase.
pub fn seed_domain(
    provider: &dyn EmbeddingProvider,
    store: &dyn EmbeddingStore,
    domain: Domain,
    known_ids: &HashSet<String>,
) -> Vec<EmbeddingRecord> {
    let pending: Vec<&str> = seed_texts(domain)
        .iter()
        .copied()
        .filter(|text| !known_ids.contains(&seed_id(domain, text)))
        .collect();
    if pending.is_empty() {
        return Vec::new();
    }

    let vectors: Vec<Option<Vec<f32>>> = match provider.embed_batch(&pending) {
        Ok(vectors) => vectors.into_iter().map(Some).collect(),
        Err(e) => {
            tracing::warn!(%domain, error = %e, "batch seed embedding failed, retrying per item");
            pending
                .iter()
                .map(|text| {
                    provider
                        .embed(text)
                        .inspect_err(|e| tracing::warn!(%domain, text, error = %e, "failed to embed seed item"))
                        .ok()
                })
                .collect()
        }
    };

    let mut records = Vec::with_capacity(pending.len());
    for (text, vector) in pending.into_iter().zip(vectors) {
        let Some(vector) = vector else { continue };
        let embedding = NewEmbedding::seed(domain, text, vector);
        let record = match store.save(embedding.clone()) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(id = %embedding.id, error = %e, "failed to persist seed embedding");
                embedding.into_record(chrono::Utc::now().timestamp_millis())
            }
        };
        records.push(record);
    }

    tracing::debug!(%domain, count = records.len(), "seed domain embedded");
    records
}
