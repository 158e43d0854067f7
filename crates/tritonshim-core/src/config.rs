//! Configuration management for the shim.
//!
//! All configuration is driven by environment variables. [`ShimConfig::from_env`]
//! reads the process environment; [`ShimConfig::from_lookup`] takes any lookup
//! function so the parsing rules can be exercised without touching it.

use std::time::Duration;

use crate::error::{ShimError, ShimResult};
use crate::types::AccountUuid;

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, one line per event.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Settings for the shared upstream HTTP client pool.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamConfig {
    /// TCP connect (dial) timeout.
    pub connect_timeout: Duration,
    /// Total timeout for a single upstream request.
    pub request_timeout: Duration,
    /// How long an idle pooled connection is kept.
    pub pool_idle_timeout: Duration,
    /// Upper bound on idle connections kept per upstream host.
    pub pool_max_idle_per_host: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
            pool_idle_timeout: Duration::from_secs(15),
            pool_max_idle_per_host: 10,
        }
    }
}

/// Global configuration for the shim.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShimConfig {
    /// Bind address for the gateway.
    pub listen: String,
    /// Log level filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
    /// Triton account the shim serves.
    pub account: AccountUuid,
    /// Region reported to clients.
    pub region: String,
    /// VMAPI base URL.
    pub vmapi_url: String,
    /// IMGAPI base URL.
    pub imgapi_url: String,
    /// PAPI base URL.
    pub papi_url: String,
    /// Account service base URL (access keys).
    pub account_api_url: String,
    /// Skip signature verification entirely. Development only.
    pub skip_signature_validation: bool,
    /// Maximum allowed distance between the signed timestamp and now.
    /// `None` disables the skew check.
    pub max_clock_skew: Option<Duration>,
    /// Maximum accepted inbound request body size in bytes.
    pub max_body_bytes: usize,
    /// Dump request and response bodies to the debug log.
    pub debug_http: bool,
    /// Upstream client pool settings.
    pub upstream: UpstreamConfig,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:9090".to_owned(),
            log_level: "info".to_owned(),
            log_format: LogFormat::Text,
            account: AccountUuid::default(),
            region: "us-east-1".to_owned(),
            vmapi_url: "http://127.0.0.1".to_owned(),
            imgapi_url: "http://127.0.0.1".to_owned(),
            papi_url: "http://127.0.0.1".to_owned(),
            account_api_url: "http://127.0.0.1".to_owned(),
            skip_signature_validation: false,
            max_clock_skew: None,
            max_body_bytes: 1024 * 1024,
            debug_http: false,
            upstream: UpstreamConfig::default(),
        }
    }
}

impl ShimConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Returns an error if a variable is set to a value that cannot be parsed.
    pub fn from_env() -> ShimResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` to resolve variable names.
    ///
    /// # Errors
    /// Returns an error if a variable is set to a value that cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ShimResult<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("SHIM_LISTEN") {
            config.listen = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("LOG_FORMAT") {
            config.log_format = match v.to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "text" | "" => LogFormat::Text,
                other => {
                    return Err(ShimError::Config(format!("unknown LOG_FORMAT: {other}")));
                }
            };
        }
        if let Some(v) = lookup("TRITON_ACCOUNT") {
            config.account = AccountUuid::new(v)?;
        }
        if let Some(v) = lookup("SHIM_REGION") {
            config.region = v;
        }
        if let Some(v) = lookup("VMAPI_URL") {
            config.vmapi_url = v;
        }
        if let Some(v) = lookup("IMGAPI_URL") {
            config.imgapi_url = v;
        }
        if let Some(v) = lookup("PAPI_URL") {
            config.papi_url = v;
        }
        if let Some(v) = lookup("ACCOUNT_API_URL") {
            config.account_api_url = v;
        }
        if let Some(v) = lookup("SHIM_SKIP_SIGNATURE_VALIDATION") {
            config.skip_signature_validation = parse_bool(&v);
        }
        if let Some(v) = lookup("SHIM_MAX_CLOCK_SKEW_SECS") {
            config.max_clock_skew = Some(parse_secs("SHIM_MAX_CLOCK_SKEW_SECS", &v)?);
        }
        if let Some(v) = lookup("SHIM_MAX_BODY_BYTES") {
            config.max_body_bytes = parse_number("SHIM_MAX_BODY_BYTES", &v)?;
        }
        if let Some(v) = lookup("SHIM_DEBUG_HTTP") {
            config.debug_http = parse_bool(&v);
        }
        if let Some(v) = lookup("UPSTREAM_CONNECT_TIMEOUT_SECS") {
            config.upstream.connect_timeout = parse_secs("UPSTREAM_CONNECT_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("UPSTREAM_REQUEST_TIMEOUT_SECS") {
            config.upstream.request_timeout = parse_secs("UPSTREAM_REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("UPSTREAM_POOL_IDLE_TIMEOUT_SECS") {
            config.upstream.pool_idle_timeout = parse_secs("UPSTREAM_POOL_IDLE_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("UPSTREAM_POOL_MAX_IDLE") {
            config.upstream.pool_max_idle_per_host = parse_number("UPSTREAM_POOL_MAX_IDLE", &v)?;
        }

        Ok(config)
    }
}

fn parse_bool(v: &str) -> bool {
    matches!(v, "1" | "true" | "yes" | "TRUE" | "YES")
}

fn parse_number<T: std::str::FromStr>(key: &str, v: &str) -> ShimResult<T> {
    v.trim()
        .parse()
        .map_err(|_| ShimError::Config(format!("{key} must be a non-negative integer, got {v:?}")))
}

fn parse_secs(key: &str, v: &str) -> ShimResult<Duration> {
    parse_number::<u64>(key, v).map(Duration::from_secs)
}
