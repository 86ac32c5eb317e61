mod common;

use std::collections::HashMap;
use std::sync::Arc;

use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use common::{FailingCache, InMemoryArticles, service};
use newsdesk::application::articles::{
    METRIC_CACHE_ERROR, METRIC_CACHE_HIT, METRIC_CACHE_MISS, METRIC_STORE_FETCH,
};
use newsdesk::cache::MemoryCache;
use newsdesk::domain::articles::ArticleDraft;

#[tokio::test]
async fn cache_paths_emit_expected_counters() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let store = InMemoryArticles::new();
    let articles = service(&store, Arc::new(MemoryCache::new()));
    let created = articles
        .create(ArticleDraft::new("t", "c").expect("draft"))
        .await
        .expect("create");

    // miss + store fetch, then hit
    articles.get(created.id).await.expect("get");
    articles.get(created.id).await.expect("get");
    articles.list().await.expect("list");

    let degraded = service(&store, Arc::new(FailingCache));
    degraded.get(created.id).await.expect("get through failing cache");

    let mut counters: HashMap<(String, Vec<(String, String)>), u64> = HashMap::new();
    for (composite_key, _, _, value) in snapshotter.snapshot().into_vec() {
        let key = composite_key.key();
        let mut labels: Vec<(String, String)> = key
            .labels()
            .map(|label| (label.key().to_string(), label.value().to_string()))
            .collect();
        labels.sort();
        if let DebugValue::Counter(count) = value {
            counters.insert((key.name().to_string(), labels), count);
        }
    }

    let count = |name: &str, labels: &[(&str, &str)]| {
        let mut labels: Vec<(String, String)> = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        labels.sort();
        counters
            .get(&(name.to_string(), labels))
            .copied()
            .unwrap_or(0)
    };

    assert_eq!(count(METRIC_CACHE_HIT, &[("keyspace", "item")]), 1);
    assert_eq!(count(METRIC_CACHE_MISS, &[("keyspace", "item")]), 2);
    assert_eq!(count(METRIC_CACHE_MISS, &[("keyspace", "collection")]), 1);
    assert_eq!(count(METRIC_STORE_FETCH, &[("keyspace", "item")]), 2);
    assert_eq!(count(METRIC_STORE_FETCH, &[("keyspace", "collection")]), 1);
    assert_eq!(
        count(METRIC_CACHE_ERROR, &[("keyspace", "item"), ("op", "get")]),
        1
    );
    assert_eq!(
        count(METRIC_CACHE_ERROR, &[("keyspace", "item"), ("op", "set")]),
        1
    );
}
