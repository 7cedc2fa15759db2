use tja_suggest::db;
use tja_suggest::db::migrations::{
    claim_embedding_model, get_embedding_model, get_schema_version, run_migrations,
    CURRENT_SCHEMA_VERSION,
};

#[test]
fn fresh_db_migrates_to_current_version() {
    let conn = db::open_memory_database().unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn migrations_are_idempotent() {
    let conn = db::open_memory_database().unwrap();
    run_migrations(&conn).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn manual_v1_db_upgrades_correctly() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    db::schema::init_schema(&conn).unwrap();

    assert_eq!(get_schema_version(&conn).unwrap(), 1);
    assert!(get_embedding_model(&conn).unwrap().is_none());

    run_migrations(&conn).unwrap();

    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    assert!(get_embedding_model(&conn).unwrap().is_none());
}

#[test]
fn configured_model_is_recorded_on_a_fresh_store() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("embeddings.db");

    {
        let store = db::embeddings::SqliteEmbeddingStore::open(&path).unwrap();
        assert_eq!(store.claim_embedding_model("bge-small-en").unwrap(), "bge-small-en");
    }

    let conn = db::open_database(&path).unwrap();
    assert_eq!(get_embedding_model(&conn).unwrap().as_deref(), Some("bge-small-en"));
    assert_eq!(claim_embedding_model(&conn, "all-MiniLM-L6-v2").unwrap(), "bge-small-en");
}
