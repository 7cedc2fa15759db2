use anyhow::Result;
use rusqlite::Connection;

use tja_suggest::config::TjaConfig;
use tja_suggest::db::{self, embeddings};
use tja_suggest::suggest::{Domain, Source};

/// Display embedding counts in the terminal.
pub fn stats(config: &TjaConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;

    println!("Embedding Statistics");
    println!("{}", "=".repeat(40));
    println!("  Total:               {}", embeddings::count(&conn, None, None)?);
    println!(
        "  Seed:                {}",
        embeddings::count(&conn, None, Some(Source::Seed))?
    );
    println!(
        "  User:                {}",
        embeddings::count(&conn, None, Some(Source::User))?
    );
    println!();

    println!("By Domain:          seed   user");
    for domain in Domain::ALL {
        println!(
            "  {:<16} {:>5}  {:>5}",
            domain.as_str(),
            embeddings::count(&conn, Some(domain), Some(Source::Seed))?,
            embeddings::count(&conn, Some(domain), Some(Source::User))?
        );
    }
    println!();

    let db_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);
    println!("Database size:         {db_size} bytes");
    print_time_range(&conn)?;

    Ok(())
}

fn print_time_range(conn: &Connection) -> Result<()> {
    let (oldest, newest): (Option<i64>, Option<i64>) = conn.query_row(
        "SELECT MIN(created_at), MAX(created_at) FROM embeddings WHERE source = 'user'",
        [],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    let format = |ms: i64| {
        chrono::DateTime::from_timestamp_millis(ms)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| ms.to_string())
    };
    if let Some(oldest) = oldest {
        println!("Oldest user entry:     {}", format(oldest));
    }
    if let Some(newest) = newest {
        println!("Newest user entry:     {}", format(newest));
    }
    Ok(())
}
