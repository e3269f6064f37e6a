use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use snaplink_aggregator::{shutdown_signal, Aggregator};
use snaplink_cache::{MokaUrlCache, RedisUrlCache};
use snaplink_core::{ClickQueue, MappingStore, UrlCache, UrlLookup};
use snaplink_gateway::config::{CacheBackendArg, QueueBackendArg, StoreBackendArg};
use snaplink_gateway::{App, AppParts, AppState, GatewayConfig};
use snaplink_generator::{AlphabetGenerator, Generator};
use snaplink_queue::{InMemoryClickQueue, RedisClickQueue};
use snaplink_redirector::HttpUrlLookup;
use snaplink_storage::{InMemoryMappingStore, MySqlMappingStore};
use snaplink_telemetry::TelemetryConfig;
use tokio::sync::oneshot;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::parse();

    let _telemetry = snaplink_telemetry::init(
        TelemetryConfig::builder()
            .service_name("snaplink-gateway")
            .log_format(config.log_format)
            .otlp_endpoint(config.otlp_endpoint.clone())
            .build(),
    )?;

    info!(
        listen_addr = %config.listen_addr,
        base_url = %config.base_url,
        store = %config.store,
        cache = %config.cache,
        queue = %config.queue,
        embedded_aggregator = config.embedded_aggregator,
        "starting gateway"
    );

    if config.queue == QueueBackendArg::InMemory && !config.embedded_aggregator {
        warn!("in-memory click queue without an embedded aggregator; clicks will not be counted");
    }

    let store = connect_store(&config).await?;
    let cache = connect_cache(&config).await?;
    let queue = connect_queue(&config).await?;
    let generator: Arc<dyn Generator> = Arc::new(
        AlphabetGenerator::new(config.generator_settings()).context("invalid generator settings")?,
    );

    let parts = AppParts::builder()
        .store(Arc::clone(&store))
        .cache(cache)
        .queue(Arc::clone(&queue))
        .generator(generator)
        .shortener(config.shortener_settings())
        .resolver(config.resolver_settings())
        .base_url(config.base_url.clone());
    let state = match &config.lookup_url {
        Some(url) => {
            info!(lookup_url = %url, "remote lookup configured, serving redirects only");
            let lookup: Arc<dyn UrlLookup> = Arc::new(
                HttpUrlLookup::with_timeout(url.as_str(), config.resolver_settings().lookup_timeout)
                    .context("failed to build remote lookup")?,
            );
            AppState::new(parts.lookup(lookup).build())
        }
        None => AppState::new(parts.build()),
    };

    let aggregator = config.embedded_aggregator.then(|| {
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let aggregator = Aggregator::new(queue, store);
        let handle = tokio::spawn(async move {
            let mut report = aggregator
                .run(async {
                    let _ = stop_rx.await;
                })
                .await;
            let drained = aggregator.drain().await;
            report.applied += drained.applied;
            report.dropped += drained.dropped;
            report.failed += drained.failed;
            report
        });
        (stop_tx, handle)
    });

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;

    if let Some((stop_tx, handle)) = aggregator {
        let _ = stop_tx.send(());
        let report = handle.await.context("embedded aggregator panicked")?;
        info!(
            applied = report.applied,
            dropped = report.dropped,
            failed = report.failed,
            "embedded aggregator stopped"
        );
    }

    info!("gateway stopped");
    Ok(())
}

async fn connect_store(config: &GatewayConfig) -> anyhow::Result<Arc<dyn MappingStore>> {
    let store: Arc<dyn MappingStore> = match config.store {
        StoreBackendArg::InMemory => Arc::new(InMemoryMappingStore::new()),
        StoreBackendArg::Mysql => {
            let dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when store backend is mysql")?;
            let store = MySqlMappingStore::connect(dsn)
                .await
                .context("failed to connect to MySQL")?;
            store
                .ensure_schema()
                .await
                .context("failed to create the mappings table")?;
            Arc::new(store)
        }
    };
    Ok(store)
}

async fn connect_cache(config: &GatewayConfig) -> anyhow::Result<Arc<dyn UrlCache>> {
    let cache: Arc<dyn UrlCache> = match config.cache {
        CacheBackendArg::Moka => Arc::new(MokaUrlCache::with_capacity(config.cache_capacity)),
        CacheBackendArg::Redis => {
            let url = config
                .cache_redis_url
                .as_deref()
                .context("redis url is required when cache backend is redis")?;
            Arc::new(
                RedisUrlCache::connect(url, snaplink_cache::redis::DEFAULT_KEY_PREFIX)
                    .await
                    .context("failed to connect to the Redis cache")?,
            )
        }
    };
    Ok(cache)
}

async fn connect_queue(config: &GatewayConfig) -> anyhow::Result<Arc<dyn ClickQueue>> {
    let queue: Arc<dyn ClickQueue> = match config.queue {
        QueueBackendArg::InMemory => Arc::new(InMemoryClickQueue::new()),
        QueueBackendArg::Redis => {
            let url = config
                .queue_redis_url
                .as_deref()
                .context("redis url is required when queue backend is redis")?;
            Arc::new(
                RedisClickQueue::connect(url, config.queue_key.clone())
                    .await
                    .context("failed to connect to the Redis click queue")?,
            )
        }
    };
    Ok(queue)
}
