//! Per-client token bucket rate limiting.
//!
//! Each client address gets its own `governor` limiter, created on first
//! use. Keys are canonical addresses, so `ip:port` or IPv4-mapped spellings
//! of one client share a bucket. The quota restores `refill_tokens` every `window` (one token every
//! `window / refill_tokens`, greedily) up to `capacity`. Idle buckets are
//! dropped by a periodic sweep.

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::{Layer, Service};
use tracing::debug;

use super::admission::{AdmissionPipeline, PerimeterTrust};
use super::client_ip::client_identity;
use crate::domain::cidr::client_address;
use crate::domain::config::RateLimitConfig;

/// Token bucket for one client
struct TokenBucket {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    /// Last access time (for cleanup)
    last_access: Instant,
}

impl TokenBucket {
    fn new(quota: Quota) -> Self {
        Self {
            limiter: RateLimiter::direct(quota),
            last_access: Instant::now(),
        }
    }

    fn check(&mut self) -> Result<(), Duration> {
        self.last_access = Instant::now();
        self.limiter
            .check()
            .map_err(|not_until| not_until.wait_time_from(DefaultClock::default().now()))
    }
}

/// Rate limiter state shared across requests
pub struct RateLimitState {
    /// Per-client token buckets
    buckets: DashMap<IpAddr, TokenBucket>,
    quota: Quota,
    enabled: bool,
}

impl RateLimitState {
    pub fn new(config: &RateLimitConfig) -> Self {
        let period = config.window / config.refill_tokens.max(1);
        let burst = NonZeroU32::new(config.capacity).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            buckets: DashMap::new(),
            quota,
            enabled: config.enabled,
        }
    }

    /// Take one token for `client`. `Err` carries the time until one is available.
    pub fn check(&self, client: IpAddr) -> Result<(), Duration> {
        if !self.enabled {
            return Ok(());
        }

        // Refill-and-consume happens under the entry's shard lock
        let mut bucket = self
            .buckets
            .entry(client)
            .or_insert_with(|| {
                debug!(client = %client, "Creating new rate limit bucket");
                TokenBucket::new(self.quota)
            });
        bucket.check()
    }

    /// Drop buckets idle for longer than `max_idle`. Returns how many were removed.
    pub fn cleanup(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let before = self.buckets.len();
        self.buckets.retain(|client, bucket| {
            let idle = now.duration_since(bucket.last_access);
            if idle > max_idle {
                debug!(client = %client, idle_secs = idle.as_secs(), "Removing idle rate limit bucket");
                false
            } else {
                true
            }
        });
        before.saturating_sub(self.buckets.len())
    }

    /// Get number of tracked clients
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

/// Rate limit layer
#[derive(Clone)]
pub struct RateLimitLayer {
    pipeline: Arc<AdmissionPipeline>,
}

impl RateLimitLayer {
    pub fn new(pipeline: Arc<AdmissionPipeline>) -> Self {
        Self { pipeline }
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            pipeline: Arc::clone(&self.pipeline),
        }
    }
}

/// Rate limit service
#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    pipeline: Arc<AdmissionPipeline>,
}

impl<S> Service<Request<Body>> for RateLimitService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let pipeline = Arc::clone(&self.pipeline);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            // Unidentifiable callers share one bucket
            let client = req
                .extensions()
                .get::<PerimeterTrust>()
                .map(|trust| trust.client)
                .or_else(|| client_identity(&req).and_then(|id| client_address(&id)))
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

            match pipeline.check_rate(client) {
                Ok(()) => inner.call(req).await,
                Err(denial) => Ok(denial.into_response()),
            }
        })
    }
}
