//! An edge gateway that resolves misses against another gateway's
//! `/resolve/{code}` endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use snaplink_cache::MokaUrlCache;
use snaplink_core::{ClickQueue, MappingStore, ShortCode, UrlCache, UrlLookup};
use snaplink_gateway::{App, AppParts, AppState};
use snaplink_queue::InMemoryClickQueue;
use snaplink_redirector::HttpUrlLookup;
use snaplink_storage::InMemoryMappingStore;
use tower::ServiceExt;

async fn spawn_owner(store: Arc<InMemoryMappingStore>) -> SocketAddr {
    let state = AppState::new(
        AppParts::builder()
            .store(store)
            .cache(Arc::new(MokaUrlCache::new()))
            .queue(Arc::new(InMemoryClickQueue::new()))
            .base_url("https://owner.test")
            .build(),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, App::router(state)).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn http_lookup_against_a_live_gateway() {
    let store = Arc::new(InMemoryMappingStore::new());
    store
        .create(&ShortCode::new("abc1234").unwrap(), "https://example.com/remote", "user-1")
        .await
        .unwrap();
    let addr = spawn_owner(store).await;

    let lookup = HttpUrlLookup::new(format!("http://{addr}/")).unwrap();
    assert_eq!(lookup.base_url(), format!("http://{addr}"));

    assert_eq!(
        lookup
            .lookup(&ShortCode::new("abc1234").unwrap())
            .await
            .unwrap()
            .as_deref(),
        Some("https://example.com/remote")
    );
    assert_eq!(
        lookup.lookup(&ShortCode::new("missing").unwrap()).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn edge_gateway_redirects_through_the_owner() {
    let owner_store = Arc::new(InMemoryMappingStore::new());
    owner_store
        .create(&ShortCode::new("edge123").unwrap(), "https://example.com/edge", "user-1")
        .await
        .unwrap();
    let addr = spawn_owner(owner_store).await;

    let queue = InMemoryClickQueue::new();
    let cache = MokaUrlCache::new();
    let lookup: Arc<dyn UrlLookup> =
        Arc::new(HttpUrlLookup::new(format!("http://{addr}")).unwrap());
    let edge = App::router(AppState::new(
        AppParts::builder()
            .store(Arc::new(InMemoryMappingStore::new()))
            .cache(Arc::new(cache.clone()))
            .queue(Arc::new(queue.clone()))
            .lookup(lookup)
            .base_url("https://edge.test")
            .build(),
    ));

    let response = edge
        .clone()
        .oneshot(Request::builder().uri("/edge123").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://example.com/edge"
    );
    assert_eq!(queue.depth().await.unwrap(), 1);

    // After eviction the edge asks the owner again.
    cache.del(&ShortCode::new("edge123").unwrap()).await.unwrap();
    let response = edge
        .clone()
        .oneshot(Request::builder().uri("/edge123").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://example.com/edge"
    );

    let response = edge
        .oneshot(Request::builder().uri("/nosuch1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn edge_gateway_does_not_own_mappings() {
    let addr = spawn_owner(Arc::new(InMemoryMappingStore::new())).await;
    let lookup: Arc<dyn UrlLookup> =
        Arc::new(HttpUrlLookup::new(format!("http://{addr}")).unwrap());
    let edge_store = Arc::new(InMemoryMappingStore::new());
    let state = AppState::new(
        AppParts::builder()
            .store(edge_store.clone())
            .cache(Arc::new(MokaUrlCache::new()))
            .queue(Arc::new(InMemoryClickQueue::new()))
            .lookup(lookup)
            .base_url("https://edge.test")
            .build(),
    );
    assert!(!state.owns_mappings());
    let edge = App::router(state);

    let response = edge
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/urls")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"long_url":"https://example.com","owner_ref":"user-1"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_client_error());
    assert!(edge_store.is_empty());

    for uri in ["/v1/urls/abc1234", "/v1/owners/user-1/urls", "/resolve/abc1234"] {
        let response = edge
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    let response = edge
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
