//! The two store operations the suggestion engine depends on.
//!
//! [`crate::db::embeddings::SqliteEmbeddingStore`] is the durable
//! implementation; [`MemoryEmbeddingStore`] stands in when the database
//! can't be opened so the session still works, it just forgets on exit.

use std::sync::Mutex;

use anyhow::Result;

use super::types::{EmbeddingRecord, NewEmbedding};

/// Append/read access to persisted embeddings.
///
/// Methods are synchronous; async callers should use
/// `tokio::task::spawn_blocking`.
pub trait EmbeddingStore: Send + Sync {
    /// Every stored record, oldest first.
    fn load_all(&self) -> Result<Vec<EmbeddingRecord>>;

    /// Write a record, stamping `created_at`. Re-saving an id replaces it,
    /// which is what makes reseeding idempotent. Returns the record as stored.
    fn save(&self, embedding: NewEmbedding) -> Result<EmbeddingRecord>;
}

/// Volatile store kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryEmbeddingStore {
    records: Mutex<Vec<EmbeddingRecord>>,
}

impl MemoryEmbeddingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EmbeddingStore for MemoryEmbeddingStore {
    fn load_all(&self) -> Result<Vec<EmbeddingRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|e| anyhow::anyhow!("store lock poisoned: {e}"))?;
        let mut all = records.clone();
        all.sort_by_key(|r| r.created_at);
        Ok(all)
    }

    fn save(&self, embedding: NewEmbedding) -> Result<EmbeddingRecord> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| anyhow::anyhow!("store lock poisoned: {e}"))?;
        let record = embedding.into_record(chrono::Utc::now().timestamp_millis());
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(record)
    }
}
