/// Why a suggestion request degraded.
///
/// None of these reach callers of [`crate::suggest::SuggestionService`]: each
/// maps to an empty list, a `None` id, or the stale cache, and is logged.
#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    #[error("embedding backend unavailable")]
    BackendUnavailable,

    #[error("rate limit exceeded")]
    Throttled,

    #[error("no response from suggestion worker within {0:?}")]
    Timeout(std::time::Duration),

    #[error("suggestion worker has stopped")]
    WorkerClosed,

    #[error("embedding failed: {0:#}")]
    Embedding(anyhow::Error),

    #[error("persistence failed: {0:#}")]
    Persistence(anyhow::Error),
}
