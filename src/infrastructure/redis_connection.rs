//! Redis connection setup.

use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{info, warn};

use super::{StoreError, StoreResult};

/// Connection attempts made before giving up at startup.
const CONNECT_ATTEMPTS: usize = 3;

/// Connects to Redis and validates the connection with a PING.
///
/// Retries with exponential backoff so a Redis instance that is still
/// starting does not force the in-memory fallback.
///
/// # Errors
///
/// Returns [`StoreError::Connection`] if the URL is invalid or every attempt
/// fails.
pub async fn connect(redis_url: &str) -> StoreResult<ConnectionManager> {
    let client = Client::open(redis_url)
        .map_err(|e| StoreError::Connection(format!("Failed to create Redis client: {}", e)))?;

    let strategy = ExponentialBackoff::from_millis(50)
        .max_delay(std::time::Duration::from_secs(1))
        .map(jitter)
        .take(CONNECT_ATTEMPTS - 1);

    let manager = Retry::spawn(strategy, || {
        let client = client.clone();
        async move {
            let mut manager = ConnectionManager::new(client).await.map_err(|e| {
                warn!("Redis connection attempt failed: {}", e);
                StoreError::Connection(format!("Failed to connect to Redis: {}", e))
            })?;
            manager
                .ping::<()>()
                .await
                .map_err(|e| StoreError::Connection(format!("Redis PING failed: {}", e)))?;
            Ok::<_, StoreError>(manager)
        }
    })
    .await?;

    info!("✓ Connected to Redis");
    Ok(manager)
}

/// PINGs Redis; used by store health checks.
pub async fn ping(manager: &ConnectionManager) -> bool {
    let mut conn = manager.clone();
    conn.ping::<()>().await.is_ok()
}
