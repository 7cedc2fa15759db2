mod helpers;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tja_suggest::config::SuggestConfig;
use tja_suggest::suggest::{
    Domain, EmbeddingStore, MemoryEmbeddingStore, Method, NewEmbedding, Source,
};

use helpers::{
    failing_loader, hash_embedding, hashing_loader, service, service_with, slow_loader,
    stalled_loader, ReadOnlyStore,
};

fn store_with(records: Vec<NewEmbedding>) -> Arc<MemoryEmbeddingStore> {
    let store = Arc::new(MemoryEmbeddingStore::new());
    for record in records {
        store.save(record).unwrap();
    }
    store
}

// ── Graceful degradation ─────────────────────────────────────────────────────

#[tokio::test]
async fn failed_model_load_serves_fuzzy_chips() {
    let svc = service(failing_loader());

    let result = svc.suggest(Domain::Needs, Some("wat")).await;

    assert!(!result.throttled);
    assert!(!result.items.is_empty());
    assert!(result.items.len() <= 8);
    assert!(result.items.iter().all(|c| c.method == Some(Method::Fuzzy)));
    assert!(result.items.iter().all(|c| c.source == Source::Seed));
    assert_eq!(result.items[0].text, "water");
    assert_eq!(result.items[0].id, "needs:water");
    assert_eq!(svc.backend_available(), Some(false));
}

#[tokio::test]
async fn fuzzy_cold_start_lists_seeds_in_order() {
    let svc = service(failing_loader());
    let result = svc.suggest(Domain::Frictions, None).await;
    let texts: Vec<&str> = result.items.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["scrolling", "overcommit", "clutter", "late nights", "self-critique"]
    );
}

#[tokio::test]
async fn ingest_without_backend_returns_none() {
    let svc = service(failing_loader());
    assert_eq!(svc.ingest(Domain::Traits, "radiant").await, None);
    assert!(svc.recent_user_embeddings().is_empty());
}

#[tokio::test]
async fn query_embedding_failure_falls_back_to_fuzzy() {
    let store = store_with(vec![NewEmbedding::seed(
        Domain::Needs,
        "rest",
        hash_embedding("rest"),
    )]);
    let svc = service_with(SuggestConfig::default(), store, hashing_loader());

    let result = svc.suggest(Domain::Needs, Some("boom")).await;

    assert!(!result.items.is_empty());
    assert!(result.items.iter().all(|c| c.method == Some(Method::Fuzzy)));
    assert_eq!(svc.backend_available(), Some(true));
}

#[tokio::test]
async fn slow_embedding_times_out_to_empty_list() {
    let store = store_with(vec![NewEmbedding::seed(
        Domain::Needs,
        "rest",
        hash_embedding("rest"),
    )]);
    let config = SuggestConfig {
        request_timeout_ms: 50,
        ..SuggestConfig::default()
    };
    let svc = service_with(config, store, slow_loader(Duration::from_millis(500)));

    let result = svc.suggest(Domain::Needs, Some("slow morning")).await;

    assert!(result.items.is_empty());
    assert!(!result.throttled);
}

#[tokio::test]
async fn slow_model_load_is_bounded_by_request_timeout() {
    let config = SuggestConfig {
        request_timeout_ms: 100,
        ..SuggestConfig::default()
    };
    let store = store_with(vec![NewEmbedding::seed(
        Domain::Needs,
        "rest",
        hash_embedding("rest"),
    )]);
    let svc = service_with(config, store, stalled_loader(Duration::from_millis(1000)));

    let started = Instant::now();
    let result = svc.suggest(Domain::Needs, Some("rest")).await;
    assert!(result.items.is_empty());
    assert!(!result.throttled);
    assert_eq!(svc.ingest(Domain::Needs, "a long bath").await, None);
    assert!(started.elapsed() < Duration::from_millis(700));
    assert_eq!(svc.backend_available(), None);

    // The load keeps going in the background and later calls use it.
    tokio::time::sleep(Duration::from_millis(1200)).await;
    let result = svc.suggest(Domain::Needs, Some("rest")).await;
    assert_eq!(svc.backend_available(), Some(true));
    assert_eq!(result.items[0].text, "rest");
    assert_eq!(result.items[0].method, Some(Method::Embedding));
}

#[tokio::test]
async fn unsaved_ingest_is_never_suggested() {
    let store = Arc::new(ReadOnlyStore(vec![NewEmbedding::seed(
        Domain::Traits,
        "steady",
        hash_embedding("steady"),
    )
    .into_record(1)]));
    let svc = service_with(SuggestConfig::default(), store, hashing_loader());

    assert_eq!(svc.ingest(Domain::Traits, "unhurried").await, None);
    assert!(svc.recent_user_embeddings().is_empty());

    let result = svc.suggest(Domain::Traits, None).await;
    assert!(!result.items.is_empty());
    assert!(result.items.iter().all(|c| c.text != "unhurried"));
    assert!(result.items.iter().all(|c| c.source == Source::Seed));
}

// ── Rate limiting ────────────────────────────────────────────────────────────

#[tokio::test]
async fn eleventh_call_is_throttled_with_last_good_items() {
    let svc = service(failing_loader());

    let mut tenth = None;
    for i in 0..10 {
        let result = svc.suggest(Domain::Needs, Some("wa")).await;
        assert!(!result.throttled, "call {} should not be throttled", i + 1);
        tenth = Some(result);
    }

    let eleventh = svc.suggest(Domain::Needs, Some("something else")).await;
    assert!(eleventh.throttled);
    assert_eq!(eleventh.items, tenth.unwrap().items);
}

#[tokio::test]
async fn throttled_domain_without_history_is_empty() {
    let config = SuggestConfig {
        rate_limit_max: 1,
        ..SuggestConfig::default()
    };
    let svc = service_with(config, Arc::new(MemoryEmbeddingStore::new()), failing_loader());

    assert!(!svc.suggest(Domain::Needs, None).await.throttled);

    let other = svc.suggest(Domain::Traits, None).await;
    assert!(other.throttled);
    assert!(other.items.is_empty());
}

#[tokio::test]
async fn ingest_shares_the_suggest_budget() {
    let config = SuggestConfig {
        rate_limit_max: 2,
        ..SuggestConfig::default()
    };
    let svc = service_with(config, Arc::new(MemoryEmbeddingStore::new()), hashing_loader());

    svc.suggest(Domain::Needs, None).await;
    assert!(svc.ingest(Domain::Needs, "a long bath").await.is_some());
    assert_eq!(svc.ingest(Domain::Needs, "a short nap").await, None);
    assert!(svc.suggest(Domain::Needs, None).await.throttled);
}

#[tokio::test]
async fn budget_recovers_after_window() {
    let config = SuggestConfig {
        rate_limit_max: 1,
        rate_window_secs: 1,
        ..SuggestConfig::default()
    };
    let svc = service_with(config, Arc::new(MemoryEmbeddingStore::new()), failing_loader());

    assert!(!svc.suggest(Domain::Needs, None).await.throttled);
    assert!(svc.suggest(Domain::Needs, None).await.throttled);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert!(!svc.suggest(Domain::Needs, None).await.throttled);
}

// ── Embedding path ───────────────────────────────────────────────────────────

#[tokio::test]
async fn exact_user_entry_ranks_first() {
    let store = store_with(vec![
        NewEmbedding::seed(Domain::Needs, "rest", hash_embedding("rest")),
        NewEmbedding::seed(Domain::Needs, "water", hash_embedding("water")),
        NewEmbedding::user(Domain::Needs, "a long bath", hash_embedding("a long bath")),
    ]);
    let svc = service_with(SuggestConfig::default(), store, hashing_loader());

    let result = svc.suggest(Domain::Needs, Some("a long bath")).await;

    assert_eq!(result.items[0].text, "a long bath");
    assert_eq!(result.items[0].source, Source::User);
    assert_eq!(result.items[0].method, Some(Method::Embedding));
}

#[tokio::test]
async fn ingested_text_is_suggested_in_its_domain_only() {
    let store = store_with(vec![
        NewEmbedding::seed(Domain::Traits, "steady", hash_embedding("steady")),
        NewEmbedding::seed(Domain::Needs, "rest", hash_embedding("rest")),
    ]);
    let svc = service_with(SuggestConfig::default(), store, hashing_loader());

    let id = svc.ingest(Domain::Traits, "unhurried").await.unwrap();
    assert!(id.starts_with("user:traits:"));

    let traits = svc.suggest(Domain::Traits, None).await;
    assert_eq!(traits.items[0].id, id);

    let needs = svc.suggest(Domain::Needs, None).await;
    assert!(needs.items.iter().all(|c| c.id != id));
}

#[tokio::test]
async fn user_records_lead_cold_start() {
    let store = store_with(vec![
        NewEmbedding::seed(Domain::Contexts, "tea ritual", hash_embedding("tea ritual")),
        NewEmbedding::user(Domain::Contexts, "the porch", hash_embedding("the porch")),
    ]);
    let svc = service_with(SuggestConfig::default(), store, hashing_loader());

    let result = svc.suggest(Domain::Contexts, None).await;
    assert_eq!(result.items[0].text, "the porch");
    assert!(result.items.len() <= 8);
}

// ── Caches ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn recent_cache_keeps_last_twenty() {
    let store = Arc::new(MemoryEmbeddingStore::new());
    let config = SuggestConfig {
        rate_limit_max: 100,
        ..SuggestConfig::default()
    };
    let svc = service_with(config, store.clone(), hashing_loader());

    for i in 0..25 {
        assert!(svc.ingest(Domain::Needs, &format!("entry {i}")).await.is_some());
    }

    let recent = svc.recent_user_embeddings();
    assert_eq!(recent.len(), 20);
    assert_eq!(recent[0].text, "entry 5");
    assert_eq!(recent[19].text, "entry 24");

    let stored_users: Vec<_> = store
        .load_all()
        .unwrap()
        .into_iter()
        .filter(|r| r.source == Source::User)
        .collect();
    assert_eq!(stored_users.len(), 25);
    // Cached copies are the stored rows, timestamps included.
    assert_eq!(&stored_users[5..], recent.as_slice());
}

#[tokio::test]
async fn recent_cache_is_primed_from_store() {
    let store = store_with(vec![NewEmbedding::user(
        Domain::Frictions,
        "doomscrolling",
        hash_embedding("doomscrolling"),
    )]);
    let svc = service_with(SuggestConfig::default(), store, failing_loader());

    svc.suggest(Domain::Frictions, None).await;
    let recent = svc.recent_user_embeddings();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].text, "doomscrolling");
}

// ── Concurrency & lifecycle ──────────────────────────────────────────────────

#[tokio::test]
async fn concurrent_callers_get_their_own_replies() {
    let svc = Arc::new(service(failing_loader()));

    let handles: Vec<_> = Domain::ALL
        .into_iter()
        .map(|domain| {
            let svc = Arc::clone(&svc);
            tokio::spawn(async move { (domain, svc.suggest(domain, None).await) })
        })
        .collect();

    for handle in handles {
        let (domain, result) = handle.await.unwrap();
        assert!(!result.items.is_empty());
        let prefix = format!("{domain}:");
        assert!(result.items.iter().all(|c| c.id.starts_with(&prefix)));
    }
}

#[tokio::test]
async fn seeds_are_embedded_in_background() {
    let store = Arc::new(MemoryEmbeddingStore::new());
    let config = SuggestConfig {
        rate_limit_max: 1000,
        ..SuggestConfig::default()
    };
    let svc = service_with(config, store.clone(), hashing_loader());

    // Callers never wait for seeding; poll until the frictions pool is ranked by embedding.
    let mut result = svc.suggest(Domain::Frictions, Some("clutter")).await;
    for _ in 0..200 {
        if result.items[0].method == Some(Method::Embedding) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        result = svc.suggest(Domain::Frictions, Some("clutter")).await;
    }
    assert_eq!(result.items[0].text, "clutter");
    assert_eq!(result.items[0].method, Some(Method::Embedding));

    let seeds = store
        .load_all()
        .unwrap()
        .iter()
        .filter(|r| r.source == Source::Seed)
        .count();
    assert_eq!(seeds, 32);

    svc.shutdown().await;
}

#[tokio::test]
async fn reframe_works_without_backend() {
    let svc = service(failing_loader());
    assert_eq!(
        svc.reframe("This is terrible and I hate it"),
        "I notice this is and i it"
    );
    assert_eq!(svc.reframe("awful"), "I notice something is present.");
}
