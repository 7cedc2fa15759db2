//! Core suggestion type definitions.
//!
//! Defines [`Domain`] (the closed set of suggestion vocabularies), [`Source`]
//! (seed corpus vs. user-entered text), [`EmbeddingRecord`] (a stored vector),
//! and the caller-facing [`Chip`] / [`SuggestResult`].

use serde::{Deserialize, Serialize};

/// Suggestion vocabularies. Extended only by shipping new seed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// What the user needs right now (Safety scene).
    Needs,
    /// Traits the user wants to embody (Clarity scene).
    Traits,
    /// Ordinary places and rituals (Calibration scene).
    Contexts,
    /// Things that get in the way (Implementation scene).
    Frictions,
}

impl Domain {
    pub const ALL: [Domain; 4] = [Self::Needs, Self::Traits, Self::Contexts, Self::Frictions];

    /// SQL-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Needs => "needs",
            Self::Traits => "traits",
            Self::Contexts => "contexts",
            Self::Frictions => "frictions",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "needs" => Ok(Self::Needs),
            "traits" => Ok(Self::Traits),
            "contexts" => Ok(Self::Contexts),
            "frictions" => Ok(Self::Frictions),
            _ => Err(format!(
                "unknown domain: {s}. Expected one of: needs, traits, contexts, frictions"
            )),
        }
    }
}

/// Where an embedding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Seed,
    User,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seed => "seed",
            Self::User => "user",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seed" => Ok(Self::Seed),
            "user" => Ok(Self::User),
            _ => Err(format!("unknown source: {s}")),
        }
    }
}

/// How a chip was ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Embedding,
    Fuzzy,
}

/// A stored embedding, matching the `embeddings` table schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    /// `seed:{domain}:{text}` for seeds, `user:{domain}:{uuid-v7}` for user text.
    pub id: String,
    pub domain: Domain,
    /// The literal text that was embedded.
    pub text: String,
    pub vector: Vec<f32>,
    pub source: Source,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl EmbeddingRecord {
    /// The write form of this record, for persisting an in-memory copy.
    pub fn to_new_embedding(&self) -> NewEmbedding {
        NewEmbedding {
            id: self.id.clone(),
            domain: self.domain,
            text: self.text.clone(),
            vector: self.vector.clone(),
            source: self.source,
        }
    }
}

/// An embedding about to be written. The store assigns `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmbedding {
    pub id: String,
    pub domain: Domain,
    pub text: String,
    pub vector: Vec<f32>,
    pub source: Source,
}

impl NewEmbedding {
    /// Build a seed embedding with its deterministic id.
    pub fn seed(domain: Domain, text: &str, vector: Vec<f32>) -> Self {
        Self {
            id: seed_id(domain, text),
            domain,
            text: text.to_string(),
            vector,
            source: Source::Seed,
        }
    }

    /// Build a user embedding with a fresh time-sortable id.
    pub fn user(domain: Domain, text: &str, vector: Vec<f32>) -> Self {
        Self {
            id: format!("user:{domain}:{}", uuid::Uuid::now_v7()),
            domain,
            text: text.to_string(),
            vector,
            source: Source::User,
        }
    }

    pub fn into_record(self, created_at: i64) -> EmbeddingRecord {
        EmbeddingRecord {
            id: self.id,
            domain: self.domain,
            text: self.text,
            vector: self.vector,
            source: self.source,
            created_at,
        }
    }
}

/// Deterministic id for a seed pair, so reseeding upserts instead of duplicating.
pub fn seed_id(domain: Domain, text: &str) -> String {
    format!("seed:{domain}:{text}")
}

/// A single suggestion shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chip {
    pub id: String,
    pub text: String,
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,
}

impl Chip {
    pub fn from_record(record: &EmbeddingRecord) -> Self {
        Self {
            id: record.id.clone(),
            text: record.text.clone(),
            source: record.source,
            method: Some(Method::Embedding),
        }
    }

    pub fn fuzzy(domain: Domain, text: String) -> Self {
        Self {
            id: format!("{domain}:{text}"),
            text,
            source: Source::Seed,
            method: Some(Method::Fuzzy),
        }
    }
}

/// Response from [`crate::suggest::SuggestionService::suggest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestResult {
    pub items: Vec<Chip>,
    /// `true` when the rate limit was hit and `items` is the last-known-good list.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub throttled: bool,
}

impl SuggestResult {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Drop the `method` tag from every chip (debug display off).
    pub fn without_method(mut self) -> Self {
        for chip in &mut self.items {
            chip.method = None;
        }
        self
    }
}
