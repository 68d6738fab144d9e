//! Admission pipeline: allow-list, then per-client rate limit.
//!
//! Rejection happens before any cryptographic work. The allow-list stage
//! applies to every route; the rate stage only to the operation routes, so
//! the two stages are exposed separately for the layers and combined in
//! [`AdmissionPipeline::admit`].

use axum::response::{IntoResponse, Response};
use pqc_telemetry::PqcMetrics;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use super::rate_limit::RateLimitState;
use crate::domain::cidr::AllowList;
use crate::domain::error::ApiError;

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// Client matched no allow-list entry
    NotWhitelisted,
    /// Client's bucket is empty
    RateExceeded {
        /// Time until the next token
        retry_after: Duration,
    },
}

impl Denial {
    /// Metric label.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotWhitelisted => "not_whitelisted",
            Self::RateExceeded { .. } => "rate_exceeded",
        }
    }
}

impl From<Denial> for ApiError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::NotWhitelisted => ApiError::not_whitelisted(),
            Denial::RateExceeded { retry_after } => {
                // Round up to whole seconds, never advertise 0
                let millis = u64::try_from(retry_after.as_millis()).unwrap_or(u64::MAX);
                ApiError::rate_limited(millis.div_ceil(1000).max(1))
            }
        }
    }
}

impl IntoResponse for Denial {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

/// Marker attached to requests that passed the perimeter.
///
/// Grants nothing beyond "allow-list passed"; carries the canonical address
/// the decision was made for. Rate buckets are keyed by this address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerimeterTrust {
    pub client: IpAddr,
}

/// Allow-list plus rate limiter, sharing one metric set.
pub struct AdmissionPipeline {
    allow_list: AllowList,
    rate_limiter: Arc<RateLimitState>,
    metrics: Arc<PqcMetrics>,
}

impl AdmissionPipeline {
    pub fn new(
        allow_list: AllowList,
        rate_limiter: Arc<RateLimitState>,
        metrics: Arc<PqcMetrics>,
    ) -> Self {
        Self {
            allow_list,
            rate_limiter,
            metrics,
        }
    }

    /// Allow-list stage. A missing identity matches nothing.
    pub fn check_allow_list(&self, client: Option<&str>) -> Result<PerimeterTrust, Denial> {
        match client.and_then(|c| self.allow_list.admitted_address(c)) {
            Some(addr) => Ok(PerimeterTrust { client: addr }),
            None => {
                warn!(client = client.unwrap_or("unknown"), "Blocked non-whitelisted client");
                self.deny(Denial::NotWhitelisted)
            }
        }
    }

    /// Rate stage.
    pub fn check_rate(&self, client: IpAddr) -> Result<(), Denial> {
        match self.rate_limiter.check(client) {
            Ok(()) => Ok(()),
            Err(retry_after) => {
                warn!(
                    client = %client,
                    retry_after_ms = u64::try_from(retry_after.as_millis()).unwrap_or(u64::MAX),
                    "Rate limit exceeded"
                );
                self.deny(Denial::RateExceeded { retry_after })
            }
        }
    }

    /// Both stages in order. `rate_limited` is false for monitoring routes.
    pub fn admit(&self, client: Option<&str>, rate_limited: bool) -> Result<PerimeterTrust, Denial> {
        let trust = self.check_allow_list(client)?;
        if rate_limited {
            self.check_rate(trust.client)?;
        }
        Ok(trust)
    }

    /// Shared bucket state, for the eviction sweep.
    pub fn rate_limiter(&self) -> &Arc<RateLimitState> {
        &self.rate_limiter
    }

    fn deny<T>(&self, denial: Denial) -> Result<T, Denial> {
        self.metrics.record_admission_denied(denial.reason());
        Err(denial)
    }
}
