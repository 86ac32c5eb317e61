mod common;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{FailingCache, InMemoryArticles, service};
use newsdesk::cache::{CacheStore, MemoryCache};
use newsdesk::infra::http::{HttpState, build_router};

fn router_with(store: &Arc<InMemoryArticles>, cache: Arc<dyn CacheStore>) -> Router {
    build_router(HttpState::new(service(store, cache)))
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let request = builder.body(body).expect("request");

    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let json = serde_json::from_slice(&bytes).expect("json envelope");
    (status, json)
}

#[tokio::test]
async fn create_then_fetch_round_trip() {
    let store = InMemoryArticles::new();
    let router = router_with(&store, Arc::new(MemoryCache::new()));

    let (status, body) = send(
        &router,
        Method::POST,
        "/news",
        Some(json!({"title": "Hello", "content": "World"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["code"], 201);
    assert_eq!(body["message"], "News created successfully");
    assert_eq!(body["data"]["id"], 1);
    assert_eq!(body["data"]["created_at"], body["data"]["updated_at"]);

    let (status, fetched) = send(&router, Method::GET, "/news/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["message"], "Success");
    assert_eq!(fetched["data"], body["data"]);
}

#[tokio::test]
async fn list_returns_articles_in_id_order() {
    let store = InMemoryArticles::new();
    let router = router_with(&store, Arc::new(MemoryCache::new()));
    for title in ["a", "b"] {
        send(
            &router,
            Method::POST,
            "/news",
            Some(json!({"title": title, "content": "x"})),
        )
        .await;
    }

    let (status, body) = send(&router, Method::GET, "/news", None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body["data"]
        .as_array()
        .expect("array")
        .iter()
        .map(|item| item["title"].as_str().expect("title"))
        .collect();
    assert_eq!(titles, vec!["a", "b"]);
}

#[tokio::test]
async fn empty_list_is_an_empty_array() {
    let store = InMemoryArticles::new();
    let router = router_with(&store, Arc::new(MemoryCache::new()));

    let (status, body) = send(&router, Method::GET, "/news", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn update_and_delete_envelopes() {
    let store = InMemoryArticles::new();
    let router = router_with(&store, Arc::new(MemoryCache::new()));
    send(
        &router,
        Method::POST,
        "/news",
        Some(json!({"title": "t", "content": "c"})),
    )
    .await;

    let (status, body) = send(
        &router,
        Method::PUT,
        "/news/1",
        Some(json!({"title": "t2", "content": "c2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "News updated successfully");
    assert_eq!(body["data"]["title"], "t2");

    let (status, body) = send(&router, Method::DELETE, "/news/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"code": 200, "message": "News deleted successfully"}));

    let (status, body) = send(&router, Method::GET, "/news/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"code": 404, "message": "News not found"}));
}

#[tokio::test]
async fn bad_ids_are_rejected_before_the_store() {
    let store = InMemoryArticles::new();
    let router = router_with(&store, Arc::new(MemoryCache::new()));

    for uri in ["/news/abc", "/news/0", "/news/-3"] {
        let (status, body) = send(&router, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, json!({"code": 400, "message": "Invalid ID"}));
    }

    let (status, _) = send(&router, Method::DELETE, "/news/x", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(store.find_calls(), 0);
}

#[tokio::test]
async fn bad_bodies_are_invalid_input() {
    let store = InMemoryArticles::new();
    let router = router_with(&store, Arc::new(MemoryCache::new()));

    let cases = [
        json!({"title": "only title"}),
        json!({"title": "", "content": "c"}),
        json!({"title": "t", "content": "   "}),
        json!({"title": "x".repeat(256), "content": "c"}),
        json!([1, 2, 3]),
    ];
    for case in cases {
        let (status, body) = send(&router, Method::POST, "/news", Some(case)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid input");
    }

    let (status, body) = send(
        &router,
        Method::PUT,
        "/news/1",
        Some(json!({"content": "no title"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid input");
}

#[tokio::test]
async fn missing_ids_on_writes_are_not_found() {
    let store = InMemoryArticles::new();
    let router = router_with(&store, Arc::new(MemoryCache::new()));

    let (status, body) = send(
        &router,
        Method::PUT,
        "/news/42",
        Some(json!({"title": "t", "content": "c"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "News not found");

    let (status, _) = send(&router, Method::DELETE, "/news/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn store_failures_map_to_operation_messages() {
    let store = InMemoryArticles::new();
    let router = router_with(&store, Arc::new(MemoryCache::new()));
    store.set_failing(true);

    let (status, body) = send(&router, Method::GET, "/news", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"code": 500, "message": "Failed to fetch news"}));

    let (_, body) = send(
        &router,
        Method::POST,
        "/news",
        Some(json!({"title": "t", "content": "c"})),
    )
    .await;
    assert_eq!(body["message"], "Failed to create news");

    let (_, body) = send(
        &router,
        Method::PUT,
        "/news/1",
        Some(json!({"title": "t", "content": "c"})),
    )
    .await;
    assert_eq!(body["message"], "Failed to update news");

    let (_, body) = send(&router, Method::DELETE, "/news/1", None).await;
    assert_eq!(body["message"], "Failed to delete news");
}

#[tokio::test]
async fn cache_outage_is_invisible_to_clients() {
    let store = InMemoryArticles::new();
    let router = router_with(&store, Arc::new(FailingCache));

    let (status, _) = send(
        &router,
        Method::POST,
        "/news",
        Some(json!({"title": "t", "content": "c"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&router, Method::GET, "/news/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "t");
}
