//! Row-level access to the `embeddings` table.
//!
//! Vectors are stored as little-endian `f32` BLOBs. Saves are upserts keyed
//! by id, so the deterministic seed ids make reseeding idempotent.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::suggest::store::EmbeddingStore;
use crate::suggest::types::{Domain, EmbeddingRecord, NewEmbedding, Source};

const SELECT_COLUMNS: &str = "SELECT id, domain, text, vector, source, created_at FROM embeddings";

pub fn vector_to_bytes(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Trailing bytes that don't make a whole `f32` are dropped.
pub fn bytes_to_vector(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Insert or replace a record, stamping `created_at` with the current time.
pub fn save(conn: &Connection, embedding: &NewEmbedding) -> Result<EmbeddingRecord> {
    let created_at = chrono::Utc::now().timestamp_millis();
    conn.execute(
        "INSERT OR REPLACE INTO embeddings (id, domain, text, vector, source, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            embedding.id,
            embedding.domain.as_str(),
            embedding.text,
            vector_to_bytes(&embedding.vector),
            embedding.source.as_str(),
            created_at,
        ],
    )
    .with_context(|| format!("failed to save embedding {}", embedding.id))?;
    Ok(embedding.clone().into_record(created_at))
}

/// All records, oldest first.
pub fn load_all(conn: &Connection) -> Result<Vec<EmbeddingRecord>> {
    query(conn, &format!("{SELECT_COLUMNS} ORDER BY created_at, rowid"), params![])
}

pub fn load_by_domain(conn: &Connection, domain: Domain) -> Result<Vec<EmbeddingRecord>> {
    query(
        conn,
        &format!("{SELECT_COLUMNS} WHERE domain = ?1 ORDER BY created_at, rowid"),
        params![domain.as_str()],
    )
}

pub fn load_by_source(conn: &Connection, source: Source) -> Result<Vec<EmbeddingRecord>> {
    query(
        conn,
        &format!("{SELECT_COLUMNS} WHERE source = ?1 ORDER BY created_at, rowid"),
        params![source.as_str()],
    )
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<EmbeddingRecord>> {
    conn.query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), params![id], read_row)
        .optional()
        .with_context(|| format!("failed to load embedding {id}"))
}

/// Delete one record. Returns whether it existed.
pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
    let changed = conn.execute("DELETE FROM embeddings WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}

/// Delete every record, optionally only those from `source`. Returns the row count.
pub fn clear(conn: &Connection, source: Option<Source>) -> Result<usize> {
    let changed = match source {
        Some(source) => conn.execute(
            "DELETE FROM embeddings WHERE source = ?1",
            params![source.as_str()],
        )?,
        None => conn.execute("DELETE FROM embeddings", [])?,
    };
    Ok(changed)
}

pub fn count(conn: &Connection, domain: Option<Domain>, source: Option<Source>) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM embeddings
         WHERE (?1 IS NULL OR domain = ?1) AND (?2 IS NULL OR source = ?2)",
        params![domain.map(|d| d.as_str()), source.map(|s| s.as_str())],
        |r| r.get(0),
    )?;
    Ok(count)
}

fn query(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<EmbeddingRecord>> {
    let mut stmt = conn.prepare(sql)?;
    let records = stmt
        .query_map(params, read_row)?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to read embeddings")?;
    Ok(records)
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<EmbeddingRecord> {
    let domain: String = row.get(1)?;
    let source: String = row.get(4)?;
    let vector: Vec<u8> = row.get(3)?;
    Ok(EmbeddingRecord {
        id: row.get(0)?,
        domain: domain.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, e.into())
        })?,
        text: row.get(2)?,
        vector: bytes_to_vector(&vector),
        source: source.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, e.into())
        })?,
        created_at: row.get(5)?,
    })
}

/// [`EmbeddingStore`] over a single SQLite connection.
pub struct SqliteEmbeddingStore {
    conn: Mutex<Connection>,
}

impl SqliteEmbeddingStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_connection(super::open_database(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_connection(super::open_memory_database()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("database lock poisoned: {e}"))?;
        f(&conn)
    }

    pub fn count(&self, domain: Option<Domain>, source: Option<Source>) -> Result<i64> {
        self.with_conn(|conn| count(conn, domain, source))
    }

    /// Record `model` for the stored vectors if none is recorded yet, and
    /// return the model on record.
    pub fn claim_embedding_model(&self, model: &str) -> Result<String> {
        self.with_conn(|conn| Ok(super::migrations::claim_embedding_model(conn, model)?))
    }
}

impl EmbeddingStore for SqliteEmbeddingStore {
    fn load_all(&self) -> Result<Vec<EmbeddingRecord>> {
        self.with_conn(load_all)
    }

    fn save(&self, embedding: NewEmbedding) -> Result<EmbeddingRecord> {
        self.with_conn(|conn| save(conn, &embedding))
    }
}

impl std::fmt::Debug for SqliteEmbeddingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteEmbeddingStore").finish_non_exhaustive()
    }
}
