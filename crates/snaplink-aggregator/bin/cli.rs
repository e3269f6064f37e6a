use clap::Parser;
use snaplink_aggregator::{DEFAULT_ERROR_BACKOFF, DEFAULT_IDLE_BACKOFF, DEFAULT_IDLE_JITTER};
use snaplink_aggregator::AggregatorSettings;
use snaplink_queue::redis::DEFAULT_QUEUE_KEY;
use snaplink_telemetry::LogFormat;
use std::time::Duration;

pub const REDIS_URL_ENV: &str = "SNAPLINK_AGGREGATOR_REDIS_URL";
pub const QUEUE_KEY_ENV: &str = "SNAPLINK_AGGREGATOR_QUEUE_KEY";
pub const MYSQL_DSN_ENV: &str = "SNAPLINK_AGGREGATOR_MYSQL_DSN";
pub const IDLE_BACKOFF_ENV: &str = "SNAPLINK_AGGREGATOR_IDLE_BACKOFF_MS";
pub const IDLE_JITTER_ENV: &str = "SNAPLINK_AGGREGATOR_IDLE_JITTER_MS";
pub const ERROR_BACKOFF_ENV: &str = "SNAPLINK_AGGREGATOR_ERROR_BACKOFF_MS";
pub const LOG_FORMAT_ENV: &str = "SNAPLINK_LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "SNAPLINK_OTLP_ENDPOINT";

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

#[derive(Debug, Parser)]
#[command(name = "snaplink-aggregator", about = "Applies queued clicks to the mapping store")]
pub struct CLI {
    #[arg(long, env = REDIS_URL_ENV, default_value = DEFAULT_REDIS_URL)]
    pub redis_url: String,

    #[arg(long, env = QUEUE_KEY_ENV, default_value = DEFAULT_QUEUE_KEY)]
    pub queue_key: String,

    #[arg(long, env = MYSQL_DSN_ENV)]
    pub mysql_dsn: String,

    #[arg(long, env = IDLE_BACKOFF_ENV, default_value_t = DEFAULT_IDLE_BACKOFF.as_millis() as u64)]
    pub idle_backoff_ms: u64,

    #[arg(long, env = IDLE_JITTER_ENV, default_value_t = DEFAULT_IDLE_JITTER.as_millis() as u64)]
    pub idle_jitter_ms: u64,

    #[arg(long, env = ERROR_BACKOFF_ENV, default_value_t = DEFAULT_ERROR_BACKOFF.as_millis() as u64)]
    pub error_backoff_ms: u64,

    #[arg(long, env = LOG_FORMAT_ENV, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}

impl CLI {
    pub fn settings(&self) -> AggregatorSettings {
        AggregatorSettings::builder()
            .idle_backoff(Duration::from_millis(self.idle_backoff_ms))
            .idle_jitter(Duration::from_millis(self.idle_jitter_ms))
            .error_backoff(Duration::from_millis(self.error_backoff_ms))
            .build()
    }
}
