//! CLI `forget` command: delete one stored phrase by id.

use anyhow::{bail, Result};

use tja_suggest::config::TjaConfig;
use tja_suggest::db::{self, embeddings};

/// Delete a single embedding so it is no longer suggested. Ids are listed
/// by `tja export`.
pub fn forget(config: &TjaConfig, id: &str) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;

    let Some(record) = embeddings::get(&conn, id)? else {
        bail!("no embedding with id {id}");
    };
    embeddings::delete(&conn, id)?;

    println!(
        "Forgot {} phrase \"{}\" ({}).",
        record.source, record.text, record.domain
    );
    println!("Takes effect the next time the server starts.");
    Ok(())
}
