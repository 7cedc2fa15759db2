//! Caller-facing façade over the suggestion worker.
//!
//! [`SuggestionService`] never surfaces an error. Every request degrades to a
//! value the UI can render: fuzzy chips, the last list it showed, an empty
//! list, or a `None` id. The worker task is spawned on the first call and
//! loads the backend and stored records itself; calls made while it loads
//! wait in its mailbox under the request timeout.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{SuggestConfig, TjaConfig};
use crate::embedding::{self, ProviderLoader};

use super::error::SuggestError;
use super::rate_limit::RateLimiter;
use super::reframe;
use super::store::{EmbeddingStore, MemoryEmbeddingStore};
use super::types::{Chip, Domain, EmbeddingRecord, SuggestResult};
use super::worker::{Request, Startup};

/// The running worker and the only strong handle on its mailbox.
struct Session {
    mailbox: mpsc::Sender<Request>,
    worker: JoinHandle<()>,
}

pub struct SuggestionService {
    config: SuggestConfig,
    store: Arc<dyn EmbeddingStore>,
    loader: Mutex<Option<ProviderLoader>>,
    session: OnceLock<Session>,
    available: Arc<OnceLock<bool>>,
    limiter: Mutex<RateLimiter>,
    last_good: Mutex<HashMap<Domain, Vec<Chip>>>,
    recent: Arc<Mutex<VecDeque<EmbeddingRecord>>>,
}

impl SuggestionService {
    pub fn new(config: SuggestConfig, store: Arc<dyn EmbeddingStore>, loader: ProviderLoader) -> Self {
        let limiter = RateLimiter::new(config.rate_limit_max, config.rate_window());
        let recent = VecDeque::with_capacity(config.recent_cache_size);
        Self {
            config,
            store,
            loader: Mutex::new(Some(loader)),
            session: OnceLock::new(),
            available: Arc::new(OnceLock::new()),
            limiter: Mutex::new(limiter),
            last_good: Mutex::new(HashMap::new()),
            recent: Arc::new(Mutex::new(recent)),
        }
    }

    /// Service backed by the configured database and embedding model.
    ///
    /// If the database can't be opened, records live in memory for this
    /// session only.
    pub fn from_config(config: &TjaConfig) -> Self {
        let db_path = config.resolved_db_path();
        let store: Arc<dyn EmbeddingStore> =
            match crate::db::embeddings::SqliteEmbeddingStore::open(&db_path) {
                Ok(store) => {
                    match store.claim_embedding_model(&config.embedding.model) {
                        Ok(stored) if stored != config.embedding.model => warn!(
                            stored = %stored,
                            configured = %config.embedding.model,
                            "embedding model changed, stored vectors will not match; run `tja reset` to rebuild"
                        ),
                        Ok(_) => {}
                        Err(e) => warn!(error = %e, "could not read recorded embedding model"),
                    }
                    Arc::new(store)
                }
                Err(e) => {
                    warn!(path = %db_path.display(), error = %e, "embedding store unavailable, keeping records in memory");
                    Arc::new(MemoryEmbeddingStore::new())
                }
            };
        Self::new(
            config.suggest.clone(),
            store,
            embedding::config_loader(&config.embedding),
        )
    }

    /// Ranked chips for `domain`, optionally relative to `text`.
    ///
    /// Throttled calls return the last list served for the domain (possibly
    /// empty) with `throttled` set. Timeouts and worker failures return an
    /// empty list.
    pub async fn suggest(&self, domain: Domain, text: Option<&str>) -> SuggestResult {
        match self.try_suggest(domain, text).await {
            Ok(result) => result,
            Err(e) => {
                warn!(%domain, error = %e, "suggestion failed, returning empty list");
                SuggestResult::empty()
            }
        }
    }

    async fn try_suggest(&self, domain: Domain, text: Option<&str>) -> Result<SuggestResult, SuggestError> {
        let session = self.session();
        if !self.acquire() {
            debug!(%domain, "throttled, serving last known suggestions");
            let items = lock(&self.last_good).get(&domain).cloned().unwrap_or_default();
            return Ok(SuggestResult {
                items,
                throttled: true,
            });
        }

        let text = text.map(str::to_string);
        let items = self
            .exchange(session, |reply| Request::Suggest {
                domain,
                text,
                reply,
            })
            .await?;
        lock(&self.last_good).insert(domain, items.clone());
        Ok(SuggestResult {
            items,
            throttled: false,
        })
    }

    /// Embed and store user text so it can be suggested later.
    ///
    /// Returns the new record's id, or `None` when throttled, when no
    /// embedding backend is available, or on any failure. Text that was not
    /// stored is never suggested.
    pub async fn ingest(&self, domain: Domain, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }
        match self.try_ingest(domain, text).await {
            Ok(id) => Some(id),
            Err(SuggestError::Throttled) => {
                debug!(%domain, "throttled, ingest dropped");
                None
            }
            Err(SuggestError::BackendUnavailable) => {
                debug!(%domain, "no embedding backend, ingest skipped");
                None
            }
            Err(e) => {
                warn!(%domain, error = %e, "ingest failed");
                None
            }
        }
    }

    async fn try_ingest(&self, domain: Domain, text: &str) -> Result<String, SuggestError> {
        let session = self.session();
        if !self.acquire() {
            return Err(SuggestError::Throttled);
        }

        let text = text.to_string();
        let embedding = self
            .exchange(session, |reply| Request::Ingest {
                domain,
                text,
                reply,
            })
            .await??;

        let store = Arc::clone(&self.store);
        let record = tokio::task::spawn_blocking(move || store.save(embedding))
            .await
            .map_err(|e| SuggestError::Persistence(e.into()))?
            .map_err(SuggestError::Persistence)?;

        // Stored either way; a missed insert only delays it to the next session.
        if let Err(e) = session
            .mailbox
            .send_timeout(Request::Insert(record.clone()), self.config.request_timeout())
            .await
        {
            warn!(id = %record.id, error = %e, "saved entry not added to this session's pool");
        }

        let id = record.id.clone();
        self.remember_recent(record);
        Ok(id)
    }

    /// Strip emotional and judgmental words and restate `text` as a neutral
    /// observation. Not rate limited.
    pub fn reframe(&self, text: &str) -> String {
        reframe::reframe(text)
    }

    /// Most recently ingested user records, oldest first.
    pub fn recent_user_embeddings(&self) -> Vec<EmbeddingRecord> {
        lock(&self.recent).iter().cloned().collect()
    }

    /// `None` until the backend has been loaded.
    pub fn backend_available(&self) -> Option<bool> {
        self.available.get().copied()
    }

    /// Close the mailbox and wait for the worker to drain it. The worker
    /// stops the seeding task on its way out.
    pub async fn shutdown(self) {
        let Some(session) = self.session.into_inner() else {
            return;
        };
        drop(session.mailbox);
        if let Err(e) = session.worker.await {
            warn!(error = %e, "suggestion worker ended abnormally");
        }
        info!("suggestion service stopped");
    }

    fn session(&self) -> &Session {
        self.session.get_or_init(|| self.start())
    }

    fn start(&self) -> Session {
        let (mailbox, receiver) = mpsc::channel(self.config.mailbox_capacity.max(1));
        let startup = Startup {
            loader: lock(&self.loader).take(),
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            recent: Arc::clone(&self.recent),
            available: Arc::clone(&self.available),
        };
        let worker = startup.spawn(receiver, mailbox.downgrade());
        Session { mailbox, worker }
    }

    /// Send a request and wait for its reply, bounded by the request timeout.
    async fn exchange<T>(
        &self,
        session: &Session,
        request: impl FnOnce(oneshot::Sender<T>) -> Request,
    ) -> Result<T, SuggestError> {
        let (reply, response) = oneshot::channel();
        let limit = self.config.request_timeout();
        tokio::time::timeout(limit, async {
            session
                .mailbox
                .send(request(reply))
                .await
                .map_err(|_| SuggestError::WorkerClosed)?;
            response.await.map_err(|_| SuggestError::WorkerClosed)
        })
        .await
        .map_err(|_| SuggestError::Timeout(limit))?
    }

    fn acquire(&self) -> bool {
        lock(&self.limiter).try_acquire()
    }

    fn remember_recent(&self, record: EmbeddingRecord) {
        let mut recent = lock(&self.recent);
        recent.push_back(record);
        while recent.len() > self.config.recent_cache_size {
            recent.pop_front();
        }
    }
}

impl std::fmt::Debug for SuggestionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionService")
            .field("config", &self.config)
            .field("backend_available", &self.backend_available())
            .finish_non_exhaustive()
    }
}

/// The guarded state stays consistent across a panic, so a poisoned lock is reused.
pub(super) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
