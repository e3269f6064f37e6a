mod cli;

use crate::cli::CLI;
use anyhow::Context;
use clap::Parser;
use snaplink_aggregator::{shutdown_signal, Aggregator};
use snaplink_queue::RedisClickQueue;
use snaplink_storage::MySqlMappingStore;
use snaplink_telemetry::TelemetryConfig;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();

    let telemetry = TelemetryConfig::builder()
        .service_name("snaplink-aggregator")
        .log_format(config.log_format)
        .otlp_endpoint(config.otlp_endpoint.clone())
        .build();
    let _telemetry = snaplink_telemetry::init(telemetry)?;

    info!(
        queue_key = %config.queue_key,
        settings = ?config.settings(),
        "starting click aggregator"
    );

    let queue = RedisClickQueue::connect(&config.redis_url, config.queue_key.clone())
        .await
        .context("failed to connect to the click queue")?;
    let store = MySqlMappingStore::connect(&config.mysql_dsn)
        .await
        .context("failed to connect to the mapping store")?;

    let aggregator = Aggregator::with_settings(queue, store, config.settings());
    let report = aggregator.run(shutdown_signal()).await;

    info!(
        applied = report.applied,
        dropped = report.dropped,
        failed = report.failed,
        "click aggregator exited"
    );
    Ok(())
}
