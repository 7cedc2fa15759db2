//! The single background task that owns the similarity index.
//!
//! Requests arrive on a bounded mailbox and are handled one at a time, each
//! carrying its own `oneshot` reply channel. A slow embedding therefore
//! delays the requests queued behind it but can never answer the wrong caller.
//!
//! The task also brings the session up: it loads the model and the stored
//! records before serving its mailbox, so callers queue behind startup under
//! their own timeouts instead of waiting on it directly.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, OnceLock};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SuggestConfig;
use crate::embedding::{self, Backend, EmbeddingProvider, ProviderLoader};

use super::error::SuggestError;
use super::fuzzy::fuzzy_rank;
use super::index::SimilarityIndex;
use super::seed::{seed_domain, seed_texts};
use super::service::lock;
use super::store::EmbeddingStore;
use super::types::{Chip, Domain, EmbeddingRecord, NewEmbedding, Source};

pub(crate) enum Request {
    Suggest {
        domain: Domain,
        text: Option<String>,
        reply: oneshot::Sender<Vec<Chip>>,
    },
    /// Embed user text. The caller persists the result and sends it back as
    /// [`Request::Insert`]; nothing enters the pool before it is saved.
    Ingest {
        domain: Domain,
        text: String,
        reply: oneshot::Sender<Result<NewEmbedding, SuggestError>>,
    },
    /// A saved user record.
    Insert(EmbeddingRecord),
    /// Seed records produced by the background seeder.
    SeedsEmbedded(Vec<EmbeddingRecord>),
}

/// Everything the worker task needs to bring a session up.
pub(crate) struct Startup {
    pub loader: Option<ProviderLoader>,
    pub store: Arc<dyn EmbeddingStore>,
    pub config: SuggestConfig,
    /// Primed with the newest stored user records.
    pub recent: Arc<Mutex<VecDeque<EmbeddingRecord>>>,
    /// Set once the backend has been chosen.
    pub available: Arc<OnceLock<bool>>,
}

impl Startup {
    /// Spawn the worker task. `seeds_to` is a weak handle on the worker's own
    /// mailbox, so seeding never keeps the worker alive after shutdown.
    pub fn spawn(
        self,
        mailbox: mpsc::Receiver<Request>,
        seeds_to: mpsc::WeakSender<Request>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let (worker, seeder) = self.start(seeds_to).await;
            worker.run(mailbox).await;
            if let Some(seeder) = seeder {
                seeder.abort();
            }
        })
    }

    async fn start(
        self,
        seeds_to: mpsc::WeakSender<Request>,
    ) -> (SuggestionWorker, Option<JoinHandle<()>>) {
        let backend = match self.loader {
            Some(loader) => embedding::initialize(loader).await,
            None => Backend::Unavailable,
        };
        let _ = self.available.set(backend.is_available());

        let stored = load_stored(Arc::clone(&self.store)).await;
        {
            let mut recent = lock(&self.recent);
            let users: Vec<&EmbeddingRecord> =
                stored.iter().filter(|r| r.source == Source::User).collect();
            let skip = users.len().saturating_sub(self.config.recent_cache_size);
            recent.extend(users.into_iter().skip(skip).cloned());
        }
        let known_seeds: HashSet<String> = stored
            .iter()
            .filter(|r| r.source == Source::Seed)
            .map(|r| r.id.clone())
            .collect();
        let index = SimilarityIndex::from_records(stored);
        info!(
            seeds = index.seed_count(),
            users = index.user_count(),
            backend = ?backend,
            "suggestion service starting"
        );

        let seeder = backend.provider().map(|provider| {
            spawn_seeder(provider, self.store, Arc::new(known_seeds), seeds_to)
        });
        (SuggestionWorker::new(backend, index, &self.config), seeder)
    }
}

async fn load_stored(store: Arc<dyn EmbeddingStore>) -> Vec<EmbeddingRecord> {
    match tokio::task::spawn_blocking(move || store.load_all()).await {
        Ok(Ok(records)) => records,
        Ok(Err(e)) => {
            warn!(error = %e, "failed to load stored embeddings, starting empty");
            Vec::new()
        }
        Err(e) => {
            warn!(error = %e, "embedding load task failed, starting empty");
            Vec::new()
        }
    }
}

pub(crate) struct SuggestionWorker {
    backend: Backend,
    index: SimilarityIndex,
    max_results: usize,
    user_bonus: f32,
}

impl SuggestionWorker {
    pub fn new(backend: Backend, index: SimilarityIndex, config: &SuggestConfig) -> Self {
        Self {
            backend,
            index,
            max_results: config.max_results,
            user_bonus: config.user_bonus,
        }
    }

    async fn run(mut self, mut mailbox: mpsc::Receiver<Request>) {
        while let Some(request) = mailbox.recv().await {
            self.handle(request).await;
        }
        debug!(
            seeds = self.index.seed_count(),
            users = self.index.user_count(),
            "suggestion worker stopped"
        );
    }

    async fn handle(&mut self, request: Request) {
        match request {
            Request::Suggest {
                domain,
                text,
                reply,
            } => {
                let chips = self.suggest(domain, text.as_deref()).await;
                // The caller may have timed out and dropped its receiver.
                let _ = reply.send(chips);
            }
            Request::Ingest {
                domain,
                text,
                reply,
            } => {
                let result = self.embed_user(domain, &text).await;
                let _ = reply.send(result);
            }
            Request::Insert(record) => self.index.insert(record),
            Request::SeedsEmbedded(records) => {
                debug!(count = records.len(), "adding seed embeddings to index");
                self.index.extend(records);
            }
        }
    }

    async fn suggest(&self, domain: Domain, text: Option<&str>) -> Vec<Chip> {
        let text = text.filter(|t| !t.is_empty());
        if !self.backend.is_available() || self.index.pool_len(domain) == 0 {
            return self.fuzzy(domain, text);
        }

        let query = match text {
            Some(text) => match self.backend.embed(text).await {
                Ok(vector) => Some(vector),
                Err(e) => {
                    warn!(%domain, error = %e, "query embedding failed, using fuzzy match");
                    return self.fuzzy(domain, Some(text));
                }
            },
            None => None,
        };

        self.index
            .rank(domain, query.as_deref(), self.user_bonus, self.max_results)
    }

    fn fuzzy(&self, domain: Domain, text: Option<&str>) -> Vec<Chip> {
        fuzzy_rank(seed_texts(domain), text, self.max_results)
            .into_iter()
            .map(|text| Chip::fuzzy(domain, text))
            .collect()
    }

    async fn embed_user(&self, domain: Domain, text: &str) -> Result<NewEmbedding, SuggestError> {
        if !self.backend.is_available() {
            return Err(SuggestError::BackendUnavailable);
        }
        let vector = self
            .backend
            .embed(text)
            .await
            .map_err(SuggestError::Embedding)?;
        Ok(NewEmbedding::user(domain, text, vector))
    }
}

/// Embed any missing seed phrases, one domain at a time, and hand each
/// domain's records to the worker as soon as they are ready.
pub(crate) fn spawn_seeder(
    provider: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn EmbeddingStore>,
    known_ids: Arc<HashSet<String>>,
    mailbox: mpsc::WeakSender<Request>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut embedded = 0;
        for domain in Domain::ALL {
            let provider = Arc::clone(&provider);
            let store = Arc::clone(&store);
            let known_ids = Arc::clone(&known_ids);
            let records = match tokio::task::spawn_blocking(move || {
                seed_domain(provider.as_ref(), store.as_ref(), domain, &known_ids)
            })
            .await
            {
                Ok(records) => records,
                Err(e) => {
                    warn!(%domain, error = %e, "seed task failed");
                    continue;
                }
            };
            if records.is_empty() {
                continue;
            }
            embedded += records.len();
            let delivered = match mailbox.upgrade() {
                Some(mailbox) => mailbox.send(Request::SeedsEmbedded(records)).await.is_ok(),
                None => false,
            };
            if !delivered {
                debug!("worker gone, abandoning seeding");
                return;
            }
        }
        info!(embedded, "seed corpus ready");
    })
}
