//! CLI `reset` command: delete stored embeddings after user confirmation.

use anyhow::{bail, Result};
use std::io::Write;

use tja_suggest::config::TjaConfig;
use tja_suggest::db::{self, embeddings};
use tja_suggest::suggest::Source;

/// Delete stored embeddings (all, or only one source) after confirmation.
pub fn reset(config: &TjaConfig, source: Option<Source>) -> Result<()> {
    let db_path = config.resolved_db_path();

    match source {
        Some(source) => println!("WARNING: This will permanently delete all {source} embeddings."),
        None => println!("WARNING: This will permanently delete ALL embeddings, seed and user."),
    }
    println!("Database: {}", db_path.display());
    print!("\nType YES to confirm: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    if input.trim() != "YES" {
        bail!("reset cancelled");
    }

    let conn = db::open_database(&db_path)?;
    let deleted = embeddings::clear(&conn, source)?;
    if source.is_none() {
        // No vectors left, so the configured model becomes the recorded one.
        db::migrations::set_embedding_model(&conn, &config.embedding.model)?;
    }

    println!("Deleted {deleted} embeddings. Reset complete.");
    Ok(())
}
