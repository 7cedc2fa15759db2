//! Phrase suggestions for a guided journaling flow.
//!
//! Each journaling scene asks the user for short phrases in one of four
//! domains: needs, traits, contexts and frictions. This crate ranks
//! candidate phrases for those prompts, learns from what the user types, and
//! keeps working when no embedding model is present.
//!
//! # Architecture
//!
//! - **Embeddings**: Local ONNX Runtime with all-MiniLM-L6-v2 (384 dimensions),
//!   loaded once per session. A failed load switches the session to fuzzy
//!   string matching.
//! - **Ranking**: Brute-force cosine similarity over the seed vocabulary and
//!   past user entries, with a small bonus for the user's own words
//! - **Storage**: SQLite, one row per embedded phrase
//! - **Transport**: MCP over stdio (primary) or Streamable HTTP
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite schema, migrations, embedding rows and health checks
//! - [`embedding`]: Text-to-vector pipeline and the per-session backend
//! - [`suggest`]: Ranking, fuzzy fallback, reframing, and the suggestion service

pub mod config;
pub mod db;
pub mod embedding;
pub mod suggest;
