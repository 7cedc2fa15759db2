use anyhow::Result;
use serde::Serialize;

use tja_suggest::config::TjaConfig;
use tja_suggest::db::{self, embeddings, migrations};
use tja_suggest::suggest::{Domain, EmbeddingRecord, Source};

/// Export format. Vectors are only included on request.
#[derive(Debug, Serialize)]
struct ExportData {
    embedding_model: Option<String>,
    records: Vec<ExportRecord>,
}

#[derive(Debug, Serialize)]
struct ExportRecord {
    id: String,
    domain: Domain,
    text: String,
    source: Source,
    created_at: i64,
    dimensions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    vector: Option<Vec<f32>>,
}

impl ExportRecord {
    fn new(record: EmbeddingRecord, with_vectors: bool) -> Self {
        Self {
            dimensions: record.vector.len(),
            vector: with_vectors.then_some(record.vector),
            id: record.id,
            domain: record.domain,
            text: record.text,
            source: record.source,
            created_at: record.created_at,
        }
    }
}

/// Export stored embeddings as JSON to stdout, optionally only one domain
/// and/or only user entries.
pub fn export(
    config: &TjaConfig,
    domain: Option<Domain>,
    user_only: bool,
    with_vectors: bool,
) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;

    let records = match (domain, user_only) {
        (Some(domain), user_only) => embeddings::load_by_domain(&conn, domain)?
            .into_iter()
            .filter(|r| !user_only || r.source == Source::User)
            .collect(),
        (None, true) => embeddings::load_by_source(&conn, Source::User)?,
        (None, false) => embeddings::load_all(&conn)?,
    };

    let data = ExportData {
        embedding_model: migrations::get_embedding_model(&conn)?,
        records: records
            .into_iter()
            .map(|r| ExportRecord::new(r, with_vectors))
            .collect(),
    };

    let json = serde_json::to_string_pretty(&data)?;
    println!("{json}");

    eprintln!("Exported {} embeddings.", data.records.len());

    Ok(())
}
