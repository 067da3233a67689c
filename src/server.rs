//! HTTP server initialization and runtime setup.
//!
//! Handles store selection, pipeline assembly and the Axum server lifecycle.

use crate::api::routes::version_groups;
use crate::application::services::{CatalogService, TokenValidator};
use crate::config::Config;
use crate::infrastructure::cache::{
    MemoryCacheStore, NullCacheStore, RedisCacheStore, ResponseCacheStore,
};
use crate::infrastructure::counters::{CounterStore, MemoryCounterStore, RedisCounterStore};
use crate::infrastructure::persistence::InMemoryCatalog;
use crate::infrastructure::redis_connection;
use crate::pipeline::{Pipeline, PipelineComponents};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use redis::aio::ConnectionManager;
use std::net::SocketAddr;
use std::sync::Arc;

/// Selected counter and cache stores.
pub struct Stores {
    pub counters: Arc<dyn CounterStore>,
    pub cache: Arc<dyn ResponseCacheStore>,
}

/// Picks Redis-backed stores when configured and reachable, in-process otherwise.
///
/// A Redis failure at startup is not fatal: the service runs with local
/// stores and logs the degradation.
pub async fn select_stores(config: &Config) -> Stores {
    let redis = match &config.redis_url {
        Some(url) => match redis_connection::connect(url).await {
            Ok(manager) => {
                tracing::info!("Redis connected, using shared stores");
                Some(manager)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using in-process stores.", e);
                None
            }
        },
        None => None,
    };

    Stores {
        counters: counter_store(config, redis.clone()),
        cache: cache_store(config, redis),
    }
}

fn counter_store(config: &Config, redis: Option<ConnectionManager>) -> Arc<dyn CounterStore> {
    match redis {
        Some(manager) => Arc::new(RedisCounterStore::new(manager)),
        None => {
            let store = Arc::new(MemoryCounterStore::new());
            store.spawn_sweeper(config.rate_limit_window());
            store
        }
    }
}

fn cache_store(config: &Config, redis: Option<ConnectionManager>) -> Arc<dyn ResponseCacheStore> {
    if !config.cache_enabled {
        tracing::info!("Response cache disabled");
        return Arc::new(NullCacheStore::new());
    }
    match redis {
        Some(manager) => Arc::new(RedisCacheStore::new(manager)),
        None => Arc::new(MemoryCacheStore::new(config.cache_max_bytes)),
    }
}

/// Assembles the pipeline around the in-memory catalog.
///
/// # Errors
///
/// Returns an error if the route registry does not cover the configured versions.
pub fn build_pipeline(config: &Config, stores: Stores) -> Result<Pipeline> {
    let catalog = Arc::new(InMemoryCatalog::seeded());
    let service = CatalogService::new(catalog.clone(), catalog, config.persistence_timeout());
    let state = AppState::new(Arc::new(service));

    let tokens = Arc::new(TokenValidator::new(
        &config.jwt_secret,
        config.jwt_issuer.clone(),
        config.jwt_leeway_seconds,
    ));

    Pipeline::new(
        config,
        PipelineComponents {
            counter_store: stores.counters,
            cache_store: stores.cache,
            tokens,
            groups: version_groups(state),
        },
    )
}

/// Runs the HTTP server with the given configuration.
///
/// Startup happens exactly once: stores, pipeline, bind, serve. The server
/// stops on Ctrl+C after in-flight requests finish.
///
/// # Errors
///
/// Returns an error if:
/// - The pipeline cannot be assembled
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let stores = select_stores(&config).await;
    let pipeline = Arc::new(build_pipeline(&config, stores)?);
    tracing::info!(
        versions = %pipeline.router().supported_header(),
        "Pipeline ready"
    );

    let app = app_router(pipeline);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
