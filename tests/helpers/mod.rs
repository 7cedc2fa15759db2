#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tja_suggest::config::SuggestConfig;
use tja_suggest::embedding::{EmbeddingProvider, ProviderLoader, EMBEDDING_DIM};
use tja_suggest::suggest::{
    EmbeddingRecord, EmbeddingStore, MemoryEmbeddingStore, NewEmbedding, SuggestionService,
};

/// Deterministic bag-of-bytes embedding: identical text gives identical
/// vectors, and texts sharing letters land close together.
pub fn hash_embedding(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; EMBEDDING_DIM];
    for b in text.to_lowercase().bytes() {
        v[b as usize % EMBEDDING_DIM] += 1.0;
    }
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

/// Embeds with [`hash_embedding`]. Text starting with `slow` sleeps for
/// `delay` first; text containing `boom` fails.
#[derive(Default)]
pub struct HashingProvider {
    pub delay: Duration,
}

impl EmbeddingProvider for HashingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.contains("boom") {
            anyhow::bail!("inference failed on {text:?}");
        }
        if text.starts_with("slow") {
            std::thread::sleep(self.delay);
        }
        Ok(hash_embedding(text))
    }
}

pub fn hashing_loader() -> ProviderLoader {
    Box::new(|| -> Result<Box<dyn EmbeddingProvider>> { Ok(Box::new(HashingProvider::default())) })
}

pub fn slow_loader(delay: Duration) -> ProviderLoader {
    Box::new(move || -> Result<Box<dyn EmbeddingProvider>> { Ok(Box::new(HashingProvider { delay })) })
}

/// Takes `delay` to load, as a large model on a cold disk would.
pub fn stalled_loader(delay: Duration) -> ProviderLoader {
    Box::new(move || -> Result<Box<dyn EmbeddingProvider>> {
        std::thread::sleep(delay);
        Ok(Box::new(HashingProvider::default()))
    })
}

pub fn failing_loader() -> ProviderLoader {
    Box::new(|| -> Result<Box<dyn EmbeddingProvider>> { anyhow::bail!("model files missing") })
}

/// Serves fixed records and rejects every write, like a database on a full
/// or read-only disk.
pub struct ReadOnlyStore(pub Vec<EmbeddingRecord>);

impl EmbeddingStore for ReadOnlyStore {
    fn load_all(&self) -> Result<Vec<EmbeddingRecord>> {
        Ok(self.0.clone())
    }

    fn save(&self, embedding: NewEmbedding) -> Result<EmbeddingRecord> {
        anyhow::bail!("attempt to write a readonly database ({})", embedding.id)
    }
}

/// A service over a fresh in-memory store.
pub fn service(loader: ProviderLoader) -> SuggestionService {
    service_with(SuggestConfig::default(), Arc::new(MemoryEmbeddingStore::new()), loader)
}

pub fn service_with(
    config: SuggestConfig,
    store: Arc<dyn EmbeddingStore>,
    loader: ProviderLoader,
) -> SuggestionService {
    SuggestionService::new(config, store, loader)
}
