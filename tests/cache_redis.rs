//! Redis response cache against a live server.
//!
//! Set `REDIS_URL` to run these; without it each test returns early.

use std::time::Duration;

use axum::body::Bytes;
use chrono::Utc;
use hotel_listing::infrastructure::cache::{CachedResponse, RedisCacheStore, ResponseCacheStore};
use hotel_listing::infrastructure::redis_connection;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serial_test::serial;

async fn connect() -> Option<ConnectionManager> {
    let url = std::env::var("REDIS_URL").ok()?;
    redis_connection::connect(&url).await.ok()
}

fn entry(resource_path: &str, ttl_secs: u64) -> CachedResponse {
    CachedResponse {
        status: 200,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Bytes::from_static(b"[]"),
        etag: "\"e\"".to_string(),
        resource_path: resource_path.to_string(),
        created_at: Utc::now(),
        ttl: Duration::from_secs(ttl_secs),
    }
}

#[tokio::test]
#[serial]
async fn test_index_set_expires_with_its_longest_entry() {
    let Some(manager) = connect().await else {
        return;
    };
    let store = RedisCacheStore::new(manager.clone());
    let root = format!("idx-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default());
    let path = format!("/{}", root);
    let index_key = format!("resp-idx:{}", root);
    let mut conn = manager;

    store.put(&format!("{}-a", root), entry(&path, 5)).await.unwrap();
    let ttl: i64 = conn.ttl(&index_key).await.unwrap();
    assert!((1..=5).contains(&ttl), "index ttl {}", ttl);

    store
        .put(&format!("{}-b", root), entry(&format!("{}/7", path), 30))
        .await
        .unwrap();
    let ttl: i64 = conn.ttl(&index_key).await.unwrap();
    assert!(ttl > 5 && ttl <= 30, "index ttl {}", ttl);

    // A shorter entry never shortens the index.
    store.put(&format!("{}-c", root), entry(&path, 2)).await.unwrap();
    let ttl: i64 = conn.ttl(&index_key).await.unwrap();
    assert!(ttl > 5, "index ttl {}", ttl);

    assert_eq!(store.invalidate_prefix(&path).await.unwrap(), 3);
    let exists: bool = conn.exists(&index_key).await.unwrap();
    assert!(!exists);
}
