//! SQLite persistence for embeddings.
//!
//! [`open_database`] creates the file, enables WAL and brings the schema up to
//! date. [`embeddings`] holds the row-level operations and the
//! [`SqliteEmbeddingStore`](embeddings::SqliteEmbeddingStore) the suggestion
//! service writes through.

pub mod embeddings;
pub mod migrations;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

/// Open (or create) the embedding database at the given path with the schema
/// initialized and migrated.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    // The server and one-shot CLI commands may hold the file at the same time.
    conn.busy_timeout(std::time::Duration::from_millis(5000))?;

    schema::init_schema(&conn).context("failed to initialize schema")?;
    migrations::run_migrations(&conn).context("failed to run migrations")?;

    tracing::info!(path = %path.display(), "database initialized");
    Ok(conn)
}

/// Open an in-memory database with the full schema.
pub fn open_memory_database() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    schema::init_schema(&conn).context("failed to initialize schema")?;
    migrations::run_migrations(&conn).context("failed to run migrations")?;
    Ok(conn)
}

/// Result of [`check_database_health`].
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub schema_version: u32,
    pub embedding_model: Option<String>,
    pub seed_count: i64,
    pub user_count: i64,
    /// Rows whose vector length differs from the most common length.
    pub malformed_vectors: i64,
    pub integrity_ok: bool,
    pub integrity_details: String,
}

pub fn check_database_health(conn: &Connection) -> Result<HealthReport> {
    let schema_version = migrations::get_schema_version(conn)?;
    let embedding_model = migrations::get_embedding_model(conn)?;
    let seed_count = embeddings::count(conn, None, Some(crate::suggest::Source::Seed))?;
    let user_count = embeddings::count(conn, None, Some(crate::suggest::Source::User))?;

    let malformed_vectors: i64 = conn.query_row(
        "WITH lens AS (SELECT length(vector) AS len, COUNT(*) AS n FROM embeddings GROUP BY len)
         SELECT COALESCE(SUM(n), 0) - COALESCE(MAX(n), 0) FROM lens",
        [],
        |r| r.get(0),
    )?;

    let integrity_details: String = conn
        .query_row("PRAGMA integrity_check", [], |r| r.get(0))
        .context("integrity check failed to run")?;

    Ok(HealthReport {
        schema_version,
        embedding_model,
        seed_count,
        user_count,
        malformed_vectors,
        integrity_ok: integrity_details == "ok",
        integrity_details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_database_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("embeddings.db");
        let conn = open_database(&path).unwrap();
        assert!(path.exists());

        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |r| r.get(0))
            .unwrap();
        assert_eq!(mode, "wal");
    }

    #[test]
    fn fresh_database_is_healthy() {
        let conn = open_memory_database().unwrap();
        let report = check_database_health(&conn).unwrap();
        assert!(report.integrity_ok);
        assert_eq!(report.schema_version, migrations::CURRENT_SCHEMA_VERSION);
        assert_eq!(report.seed_count + report.user_count, 0);
        assert_eq!(report.malformed_vectors, 0);
    }
}
