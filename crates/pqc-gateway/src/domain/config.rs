//! Gateway configuration with validation.
//!
//! Loading order: defaults, then an optional TOML file, then environment
//! overrides. [`GatewayConfig::validate`] runs last and is fatal.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use super::cidr::{AllowList, ConfigurationError};

/// Main gateway configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP server configuration
    pub http: HttpConfig,
    /// Perimeter configuration
    pub security: SecurityConfig,
    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,
    /// Key pool configuration
    pub pool: PoolConfig,
    /// Request limits
    pub limits: LimitsConfig,
}

impl GatewayConfig {
    /// Parse a TOML document; absent sections and keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `PQC_*` overrides from `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("PQC_HTTP_HOST") {
            self.http.host = host
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOverride("PQC_HTTP_HOST", host))?;
        }
        if let Some(port) = lookup("PQC_HTTP_PORT") {
            self.http.port = parse_override("PQC_HTTP_PORT", &port)?;
        }
        if let Some(ips) = lookup("PQC_ALLOWED_IPS") {
            self.security.allowed_ips = ips
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(size) = lookup("PQC_POOL_KEM_SIZE") {
            self.pool.kem_size = parse_override("PQC_POOL_KEM_SIZE", &size)?;
        }
        if let Some(size) = lookup("PQC_POOL_DSA_SIZE") {
            self.pool.dsa_size = parse_override("PQC_POOL_DSA_SIZE", &size)?;
        }
        if let Some(ms) = lookup("PQC_POOL_REFILL_INTERVAL_MS") {
            self.pool.refill_interval =
                Duration::from_millis(parse_override("PQC_POOL_REFILL_INTERVAL_MS", &ms)?);
        }
        if let Some(capacity) = lookup("PQC_RATE_LIMIT_CAPACITY") {
            self.rate_limit.capacity = parse_override("PQC_RATE_LIMIT_CAPACITY", &capacity)?;
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate rate limits
        if self.rate_limit.capacity == 0 {
            return Err(ConfigError::InvalidRateLimit("capacity cannot be 0".into()));
        }
        if self.rate_limit.refill_tokens == 0 {
            return Err(ConfigError::InvalidRateLimit(
                "refill_tokens cannot be 0".into(),
            ));
        }
        if self.rate_limit.window.is_zero() {
            return Err(ConfigError::InvalidRateLimit("window cannot be 0".into()));
        }
        if self.rate_limit.cleanup_interval.is_zero() {
            return Err(ConfigError::InvalidRateLimit(
                "cleanup_interval cannot be 0".into(),
            ));
        }
        match self.rate_limit.full_refill_time() {
            Some(refill) if self.rate_limit.max_idle >= refill => {}
            Some(_) => {
                return Err(ConfigError::InvalidRateLimit(
                    "max_idle must cover a full bucket refill".into(),
                ));
            }
            None => {
                return Err(ConfigError::InvalidRateLimit(
                    "window too large for the configured capacity".into(),
                ));
            }
        }

        // Validate pool
        if self.pool.refill_interval.is_zero() {
            return Err(ConfigError::InvalidPool(
                "refill_interval cannot be 0".into(),
            ));
        }

        // Validate limits
        if self.limits.max_request_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_request_size cannot be 0".into(),
            ));
        }

        // Validate perimeter
        AllowList::parse(&self.security.allowed_ips)?;

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

fn parse_override<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidOverride(key, value.to_string()))
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
        }
    }
}

/// Perimeter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Literal addresses or CIDR ranges allowed to reach the service
    pub allowed_ips: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_ips: vec!["127.0.0.1".to_string(), "::1".to_string()],
        }
    }
}

/// Per-client token bucket configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    pub enabled: bool,
    /// Bucket size
    pub capacity: u32,
    /// Tokens restored per window
    pub refill_tokens: u32,
    /// Refill window
    #[serde(with = "humantime_serde")]
    pub window: Duration,
    /// How often idle buckets are swept
    #[serde(with = "humantime_serde")]
    pub cleanup_interval: Duration,
    /// Buckets idle longer than this are evicted
    #[serde(with = "humantime_serde")]
    pub max_idle: Duration,
}

impl RateLimitConfig {
    /// Time for an empty bucket to refill completely, `None` when it
    /// does not fit in a `Duration`.
    pub fn full_refill_time(&self) -> Option<Duration> {
        if self.refill_tokens == 0 {
            return None;
        }
        let ratio = f64::from(self.capacity) / f64::from(self.refill_tokens);
        Duration::try_from_secs_f64(self.window.as_secs_f64() * ratio).ok()
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 20,
            refill_tokens: 20,
            window: Duration::from_secs(1),
            cleanup_interval: Duration::from_secs(30),
            max_idle: Duration::from_secs(60),
        }
    }
}

/// Key pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Target ML-KEM-768 pool size
    pub kem_size: usize,
    /// Target ML-DSA-65 pool size
    pub dsa_size: usize,
    /// Delay between refill passes
    #[serde(with = "humantime_serde")]
    pub refill_interval: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            kem_size: 20,
            dsa_size: 20,
            refill_interval: Duration::from_millis(5000),
        }
    }
}

/// Request limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body in bytes
    pub max_request_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_size: 64 * 1024,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file did not parse
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    /// Environment override has the wrong type
    #[error("invalid value for {0}: '{1}'")]
    InvalidOverride(&'static str, String),
    /// Invalid rate limiting configuration
    #[error("invalid rate limit: {0}")]
    InvalidRateLimit(String),
    /// Invalid key pool configuration
    #[error("invalid pool: {0}")]
    InvalidPool(String),
    /// Invalid size limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Unparsable allow-list entry
    #[error(transparent)]
    AllowList(#[from] ConfigurationError),
}

/// Durations as `"250ms"`, `"5s"`, `"2m"` or bare seconds.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_nanos() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        // "ms" before "s"
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(|_| "invalid minutes")
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration")
        }
    }
}
