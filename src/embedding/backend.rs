//! The inference backend capability, selected once per session.

use std::sync::Arc;

use anyhow::{Context, Result};

use super::EmbeddingProvider;

/// Builds a provider. Runs once, on a blocking thread, at first use.
pub type ProviderLoader = Box<dyn FnOnce() -> Result<Box<dyn EmbeddingProvider>> + Send + 'static>;

/// Whether embeddings can be computed this session.
///
/// Chosen by [`initialize`] and never re-evaluated: a model that failed to
/// load stays unavailable and callers use fuzzy matching instead.
#[derive(Clone)]
pub enum Backend {
    Available(Arc<dyn EmbeddingProvider>),
    Unavailable,
}

impl Backend {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn provider(&self) -> Option<Arc<dyn EmbeddingProvider>> {
        match self {
            Self::Available(provider) => Some(Arc::clone(provider)),
            Self::Unavailable => None,
        }
    }

    /// Embed `text` off the async runtime (CPU-heavy → spawn_blocking).
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let provider = match self {
            Self::Available(provider) => Arc::clone(provider),
            Self::Unavailable => anyhow::bail!("embedding backend unavailable"),
        };
        let text = text.to_string();
        tokio::task::spawn_blocking(move || provider.embed(&text))
            .await
            .context("embedding task failed")?
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available(p) => write!(f, "Backend::Available({} dims)", p.dimensions()),
            Self::Unavailable => f.write_str("Backend::Unavailable"),
        }
    }
}

/// Run the loader and settle on a backend. Never fails: load errors and
/// panics both produce [`Backend::Unavailable`].
pub async fn initialize(loader: ProviderLoader) -> Backend {
    match tokio::task::spawn_blocking(loader).await {
        Ok(Ok(provider)) => {
            tracing::info!(dims = provider.dimensions(), "embedding backend available");
            Backend::Available(Arc::from(provider))
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "failed to load embedding model, using fuzzy matching for this session");
            Backend::Unavailable
        }
        Err(e) => {
            tracing::error!(error = %e, "embedding loader panicked, using fuzzy matching for this session");
            Backend::Unavailable
        }
    }
}
