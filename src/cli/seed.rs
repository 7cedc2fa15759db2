//! CLI `seed` command: embed the built-in vocabulary ahead of time.

use anyhow::{bail, Context, Result};
use std::collections::HashSet;

use tja_suggest::config::TjaConfig;
use tja_suggest::db::embeddings::SqliteEmbeddingStore;
use tja_suggest::embedding;
use tja_suggest::suggest::seed::{seed_domain, seed_texts};
use tja_suggest::suggest::{Domain, EmbeddingStore, Source};

/// Embed and store every seed phrase not already in the database.
pub fn seed(config: &TjaConfig) -> Result<()> {
    let provider = embedding::create_provider(&config.embedding)
        .context("embedding model unavailable")?;
    let store = SqliteEmbeddingStore::open(config.resolved_db_path())?;
    let recorded = store.claim_embedding_model(&config.embedding.model)?;
    if recorded != config.embedding.model {
        bail!(
            "database vectors were made by {recorded}, but {} is configured; run `tja reset` first",
            config.embedding.model
        );
    }

    let known: HashSet<String> = store
        .load_all()?
        .into_iter()
        .filter(|r| r.source == Source::Seed)
        .map(|r| r.id)
        .collect();

    let mut total = 0;
    for domain in Domain::ALL {
        let added = seed_domain(provider.as_ref(), &store, domain, &known).len();
        total += added;
        println!(
            "  {:<10} {added} new of {}",
            domain.as_str(),
            seed_texts(domain).len()
        );
    }

    println!("Seeded {total} phrases.");
    Ok(())
}
