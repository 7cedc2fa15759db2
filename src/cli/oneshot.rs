//! One-shot `suggest`, `ingest` and `reframe` commands.
//!
//! Each builds a fresh service, makes a single call and shuts it down, so the
//! rate limit and caches never carry over between invocations.

use anyhow::Result;

use tja_suggest::config::TjaConfig;
use tja_suggest::suggest::{reframe, Domain, SuggestionService};

pub async fn suggest(config: &TjaConfig, domain: Domain, text: Option<&str>) -> Result<()> {
    let service = SuggestionService::from_config(config);
    let mut result = service.suggest(domain, text).await;
    service.shutdown().await;

    if !config.ui.show_method {
        result = result.without_method();
    }
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub async fn ingest(config: &TjaConfig, domain: Domain, text: &str) -> Result<()> {
    let service = SuggestionService::from_config(config);
    let id = service.ingest(domain, text).await;
    service.shutdown().await;

    match id {
        Some(id) => println!("{id}"),
        None => anyhow::bail!("text was not stored (is the model downloaded? see `tja doctor`)"),
    }
    Ok(())
}

pub fn reframe(text: &str) {
    println!("{}", reframe::reframe(text));
}
