use clap::{Parser, ValueEnum};
use snaplink_generator::alphabet::DEFAULT_LENGTH;
use snaplink_generator::GeneratorSettings;
use snaplink_queue::redis::DEFAULT_QUEUE_KEY;
use snaplink_redirector::{
    ResolverSettings, DEFAULT_CACHE_TIMEOUT, DEFAULT_CACHE_TTL, DEFAULT_ENQUEUE_TIMEOUT,
    DEFAULT_LOOKUP_TIMEOUT,
};
use snaplink_shortener::{ShortenerSettings, DEFAULT_MAX_ATTEMPTS};
use snaplink_telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;

pub const LISTEN_ADDR_ENV: &str = "SNAPLINK_GATEWAY_LISTEN_ADDR";
pub const BASE_URL_ENV: &str = "SNAPLINK_GATEWAY_BASE_URL";
pub const STORE_BACKEND_ENV: &str = "SNAPLINK_GATEWAY_STORE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "SNAPLINK_GATEWAY_MYSQL_DSN";
pub const CACHE_BACKEND_ENV: &str = "SNAPLINK_GATEWAY_CACHE_BACKEND";
pub const CACHE_REDIS_URL_ENV: &str = "SNAPLINK_GATEWAY_CACHE_REDIS_URL";
pub const CACHE_CAPACITY_ENV: &str = "SNAPLINK_GATEWAY_CACHE_CAPACITY";
pub const QUEUE_BACKEND_ENV: &str = "SNAPLINK_GATEWAY_QUEUE_BACKEND";
pub const QUEUE_REDIS_URL_ENV: &str = "SNAPLINK_GATEWAY_QUEUE_REDIS_URL";
pub const QUEUE_KEY_ENV: &str = "SNAPLINK_GATEWAY_QUEUE_KEY";
pub const LOOKUP_URL_ENV: &str = "SNAPLINK_GATEWAY_LOOKUP_URL";
pub const CACHE_TTL_ENV: &str = "SNAPLINK_GATEWAY_CACHE_TTL_SECS";
pub const LOOKUP_TIMEOUT_ENV: &str = "SNAPLINK_GATEWAY_LOOKUP_TIMEOUT_MS";
pub const ENQUEUE_TIMEOUT_ENV: &str = "SNAPLINK_GATEWAY_ENQUEUE_TIMEOUT_MS";
pub const CACHE_TIMEOUT_ENV: &str = "SNAPLINK_GATEWAY_CACHE_TIMEOUT_MS";
pub const MAX_ATTEMPTS_ENV: &str = "SNAPLINK_GATEWAY_MAX_ATTEMPTS";
pub const CODE_LENGTH_ENV: &str = "SNAPLINK_GATEWAY_CODE_LENGTH";
pub const EMBEDDED_AGGREGATOR_ENV: &str = "SNAPLINK_GATEWAY_EMBEDDED_AGGREGATOR";
pub const LOG_FORMAT_ENV: &str = "SNAPLINK_LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "SNAPLINK_OTLP_ENDPOINT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_CACHE_CAPACITY: u64 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StoreBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackendArg::InMemory => write!(f, "in-memory"),
            StoreBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackendArg {
    #[value(name = "moka")]
    Moka,
    #[value(name = "redis")]
    Redis,
}

impl Display for CacheBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackendArg::Moka => write!(f, "moka"),
            CacheBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueueBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "redis")]
    Redis,
}

impl Display for QueueBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueBackendArg::InMemory => write!(f, "in-memory"),
            QueueBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "snaplink-gateway", about = "Snaplink HTTP gateway")]
pub struct GatewayConfig {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Public origin short URLs are built from.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(
        long,
        env = STORE_BACKEND_ENV,
        value_enum,
        default_value_t = StoreBackendArg::InMemory
    )]
    pub store: StoreBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("store", "mysql"))]
    pub mysql_dsn: Option<String>,

    #[arg(
        long,
        env = CACHE_BACKEND_ENV,
        value_enum,
        default_value_t = CacheBackendArg::Moka
    )]
    pub cache: CacheBackendArg,

    #[arg(long, env = CACHE_REDIS_URL_ENV, required_if_eq("cache", "redis"))]
    pub cache_redis_url: Option<String>,

    /// Maximum entries held by the in-process cache.
    #[arg(long, env = CACHE_CAPACITY_ENV, default_value_t = DEFAULT_CACHE_CAPACITY)]
    pub cache_capacity: u64,

    #[arg(
        long,
        env = QUEUE_BACKEND_ENV,
        value_enum,
        default_value_t = QueueBackendArg::InMemory
    )]
    pub queue: QueueBackendArg,

    #[arg(long, env = QUEUE_REDIS_URL_ENV, required_if_eq("queue", "redis"))]
    pub queue_redis_url: Option<String>,

    #[arg(long, env = QUEUE_KEY_ENV, default_value = DEFAULT_QUEUE_KEY)]
    pub queue_key: String,

    /// Base URL of a remote `/resolve/{code}` endpoint. Redirects use the
    /// local store when unset. When set the gateway only redirects: `/v1`
    /// and `/resolve` are not served and clicks are counted by the owner.
    #[arg(long, env = LOOKUP_URL_ENV, conflicts_with = "embedded_aggregator")]
    pub lookup_url: Option<String>,

    #[arg(long, env = CACHE_TTL_ENV, default_value_t = DEFAULT_CACHE_TTL.as_secs())]
    pub cache_ttl_secs: u64,

    #[arg(long, env = LOOKUP_TIMEOUT_ENV, default_value_t = DEFAULT_LOOKUP_TIMEOUT.as_millis() as u64)]
    pub lookup_timeout_ms: u64,

    #[arg(long, env = ENQUEUE_TIMEOUT_ENV, default_value_t = DEFAULT_ENQUEUE_TIMEOUT.as_millis() as u64)]
    pub enqueue_timeout_ms: u64,

    #[arg(long, env = CACHE_TIMEOUT_ENV, default_value_t = DEFAULT_CACHE_TIMEOUT.as_millis() as u64)]
    pub cache_timeout_ms: u64,

    #[arg(long, env = MAX_ATTEMPTS_ENV, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    #[arg(long, env = CODE_LENGTH_ENV, default_value_t = DEFAULT_LENGTH)]
    pub code_length: usize,

    /// Run a click aggregator inside the gateway process. Needed with the
    /// in-memory queue, since nothing else can read it.
    #[arg(long, env = EMBEDDED_AGGREGATOR_ENV)]
    pub embedded_aggregator: bool,

    #[arg(long, env = LOG_FORMAT_ENV, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}

impl GatewayConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn shortener_settings(&self) -> ShortenerSettings {
        ShortenerSettings::builder()
            .max_attempts(self.max_attempts)
            .cache_ttl(self.cache_ttl())
            .build()
    }

    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings::builder()
            .cache_ttl(self.cache_ttl())
            .lookup_timeout(Duration::from_millis(self.lookup_timeout_ms))
            .enqueue_timeout(Duration::from_millis(self.enqueue_timeout_ms))
            .cache_timeout(Duration::from_millis(self.cache_timeout_ms))
            .build()
    }

    pub fn generator_settings(&self) -> GeneratorSettings {
        GeneratorSettings::builder().length(self.code_length).build()
    }
}
