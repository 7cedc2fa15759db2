//! CLI `doctor` command: check the model files and database, print a report.

use anyhow::{Context, Result};

use tja_suggest::config::TjaConfig;
use tja_suggest::db;
use tja_suggest::suggest::seed::seed_texts;
use tja_suggest::suggest::Domain;

/// Run diagnostics and print a health report.
pub fn doctor(config: &TjaConfig) -> Result<()> {
    println!("tja Health Report");
    println!("=================");
    println!();

    let (model_path, tokenizer_path) = super::model_files(&config.embedding);
    let model_ready = model_path.exists() && tokenizer_path.exists();
    println!("Embedding model:   {}", config.embedding.model);
    println!("  model.onnx:      {}", presence(model_path.exists()));
    println!("  tokenizer.json:  {}", presence(tokenizer_path.exists()));
    if !model_ready {
        println!("  Suggestions will use fuzzy matching. Run `tja model download`.");
    }
    println!();

    let db_path = config.resolved_db_path();
    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `tja seed` or `tja serve` to initialize.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let conn = db::open_database(&db_path).context("failed to open database (may be corrupt)")?;

    let report = db::check_database_health(&conn).context("failed to run health check")?;

    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!();
    println!("Vectors:");
    println!(
        "  Stored model:    {}",
        report.embedding_model.as_deref().unwrap_or("(not set)")
    );
    if let Some(ref stored) = report.embedding_model {
        if stored != &config.embedding.model {
            println!("  WARNING: model mismatch! Run `tja reset` then `tja seed`.");
        } else {
            println!("  Status:          OK (match)");
        }
    }
    let expected_seeds: usize = Domain::ALL.iter().map(|d| seed_texts(*d).len()).sum();
    println!("  Seed phrases:    {} of {expected_seeds}", report.seed_count);
    println!("  User entries:    {}", report.user_count);
    if report.malformed_vectors > 0 {
        println!(
            "  WARNING: {} vectors have an unexpected length and will never rank.",
            report.malformed_vectors
        );
    }
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  1. Keep your entries: tja export --user-only > entries.json");
        println!("  2. Remove {} and run `tja seed`", db_path.display());
    }

    Ok(())
}

fn presence(found: bool) -> &'static str {
    if found {
        "found"
    } else {
        "missing"
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
