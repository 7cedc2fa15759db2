//! Suggestion engine: ranks short phrases for the four journaling domains.
//!
//! [`SuggestionService`] is the entry point. Behind it a single worker task
//! owns the [`SimilarityIndex`] and ranks by cosine similarity when an
//! embedding model is loaded, or by string closeness over the seed
//! vocabulary when it isn't.

pub mod error;
pub mod fuzzy;
pub mod index;
pub mod rate_limit;
pub mod reframe;
pub mod seed;
pub mod service;
pub mod similarity;
pub mod store;
pub mod types;
mod worker;

pub use error::SuggestError;
pub use index::SimilarityIndex;
pub use service::SuggestionService;
pub use store::{EmbeddingStore, MemoryEmbeddingStore};
pub use types::{Chip, Domain, EmbeddingRecord, Method, NewEmbedding, Source, SuggestResult};
