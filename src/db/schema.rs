//! SQL DDL for the embedding store.
//!
//! Defines the `embeddings` and `schema_meta` tables. All DDL uses
//! `IF NOT EXISTS` for idempotent initialization.

use rusqlite::Connection;

const SCHEMA_SQL: &str = r#"
-- One row per embedded phrase; vector is little-endian f32
CREATE TABLE IF NOT EXISTS embeddings (
    id TEXT PRIMARY KEY,
    domain TEXT NOT NULL CHECK(domain IN ('needs','traits','contexts','frictions')),
    text TEXT NOT NULL,
    vector BLOB NOT NULL,
    source TEXT NOT NULL CHECK(source IN ('seed','user')),
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_embeddings_domain ON embeddings(domain);
CREATE INDEX IF NOT EXISTS idx_embeddings_source ON embeddings(source);
CREATE INDEX IF NOT EXISTS idx_embeddings_created ON embeddings(created_at);

CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
