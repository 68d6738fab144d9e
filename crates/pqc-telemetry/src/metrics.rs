//! Prometheus metrics for the PQC gateway.
//!
//! All metrics follow the naming convention: `pqc_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Histogram**: per-operation wall-clock duration
//! - **Counter**: sign/verify outcomes, admission denials, pool exhaustion
//! - **Gauge**: current pool depth per family
//!
//! Each [`PqcMetrics`] owns its registry so that independent instances
//! (one per test, say) never collide on registration.

use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, HistogramVec, IntCounterVec,
    IntGaugeVec, Opts, Registry, TextEncoder,
};
use std::time::Instant;

use crate::TelemetryError;

/// Timed cryptographic operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Key-pair dispense
    KeyGen,
    /// KEM encapsulation
    Encapsulate,
    /// KEM decapsulation
    Decapsulate,
    /// Detached signing
    Sign,
    /// Signature verification
    Verify,
}

impl Operation {
    /// Label value for the `operation` dimension.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeyGen => "keygen",
            Self::Encapsulate => "encapsulate",
            Self::Decapsulate => "decapsulate",
            Self::Sign => "sign",
            Self::Verify => "verify",
        }
    }
}

/// Sign/verify outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Signature produced / signature valid
    Success,
    /// Signing rejected / signature invalid or malformed
    Fail,
}

impl Outcome {
    /// Label value for the `result` dimension.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Fail => "fail",
        }
    }
}

/// Metric set shared by the pool, the operation service and the admission layers.
#[derive(Clone)]
pub struct PqcMetrics {
    registry: Registry,
    operation_duration: HistogramVec,
    sign_results: IntCounterVec,
    verify_results: IntCounterVec,
    admission_denied: IntCounterVec,
    pool_size: IntGaugeVec,
    pool_exhausted: IntCounterVec,
}

impl std::fmt::Debug for PqcMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PqcMetrics").finish_non_exhaustive()
    }
}

fn init_err(e: prometheus::Error) -> TelemetryError {
    TelemetryError::MetricsInit(e.to_string())
}

impl PqcMetrics {
    /// Create and register every metric on a fresh registry.
    pub fn new() -> Result<Self, TelemetryError> {
        let registry = Registry::new();

        // 0.5ms .. ~4s
        let buckets = exponential_buckets(0.0005, 2.0, 14).map_err(init_err)?;
        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "pqc_operation_duration_seconds",
                "Wall-clock duration of cryptographic operations",
            )
            .buckets(buckets),
            &["operation"],
        )
        .map_err(init_err)?;

        let sign_results = IntCounterVec::new(
            Opts::new("pqc_sign_result_total", "Signing attempts by outcome"),
            &["result"],
        )
        .map_err(init_err)?;

        let verify_results = IntCounterVec::new(
            Opts::new("pqc_verify_result_total", "Verification attempts by outcome"),
            &["result"],
        )
        .map_err(init_err)?;

        let admission_denied = IntCounterVec::new(
            Opts::new(
                "pqc_admission_denied_total",
                "Requests rejected at the perimeter",
            ),
            &["reason"], // not_whitelisted / rate_exceeded
        )
        .map_err(init_err)?;

        let pool_size = IntGaugeVec::new(
            Opts::new("pqc_pool_size", "Pre-generated key pairs currently pooled"),
            &["family"],
        )
        .map_err(init_err)?;

        let pool_exhausted = IntCounterVec::new(
            Opts::new(
                "pqc_pool_exhausted_total",
                "Borrows served by synchronous generation because the pool was empty",
            ),
            &["family"],
        )
        .map_err(init_err)?;

        registry
            .register(Box::new(operation_duration.clone()))
            .map_err(init_err)?;
        registry
            .register(Box::new(sign_results.clone()))
            .map_err(init_err)?;
        registry
            .register(Box::new(verify_results.clone()))
            .map_err(init_err)?;
        registry
            .register(Box::new(admission_denied.clone()))
            .map_err(init_err)?;
        registry
            .register(Box::new(pool_size.clone()))
            .map_err(init_err)?;
        registry
            .register(Box::new(pool_exhausted.clone()))
            .map_err(init_err)?;

        Ok(Self {
            registry,
            operation_duration,
            sign_results,
            verify_results,
            admission_denied,
            pool_size,
            pool_exhausted,
        })
    }

    /// Start timing `operation`. The duration is observed when the timer drops.
    pub fn start_timer(&self, operation: Operation) -> OperationTimer {
        OperationTimer::new(
            self.operation_duration
                .with_label_values(&[operation.as_str()]),
        )
    }

    /// Count a signing outcome.
    pub fn record_sign(&self, outcome: Outcome) {
        self.sign_results.with_label_values(&[outcome.as_str()]).inc();
    }

    /// Count a verification outcome.
    pub fn record_verify(&self, outcome: Outcome) {
        self.verify_results
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    /// Count a perimeter rejection.
    pub fn record_admission_denied(&self, reason: &str) {
        self.admission_denied.with_label_values(&[reason]).inc();
    }

    /// Publish the current depth of a family's pool.
    pub fn set_pool_size(&self, family: &str, size: usize) {
        self.pool_size
            .with_label_values(&[family])
            .set(i64::try_from(size).unwrap_or(i64::MAX));
    }

    /// Count a borrow that found the pool empty.
    pub fn record_pool_exhausted(&self, family: &str) {
        self.pool_exhausted.with_label_values(&[family]).inc();
    }

    /// Observations recorded for `operation`.
    pub fn operation_count(&self, operation: Operation) -> u64 {
        self.operation_duration
            .with_label_values(&[operation.as_str()])
            .get_sample_count()
    }

    /// Current sign counter for `outcome`.
    pub fn sign_count(&self, outcome: Outcome) -> u64 {
        self.sign_results.with_label_values(&[outcome.as_str()]).get()
    }

    /// Current verify counter for `outcome`.
    pub fn verify_count(&self, outcome: Outcome) -> u64 {
        self.verify_results
            .with_label_values(&[outcome.as_str()])
            .get()
    }

    /// Current denial counter for `reason`.
    pub fn admission_denied_count(&self, reason: &str) -> u64 {
        self.admission_denied.with_label_values(&[reason]).get()
    }

    /// Last published pool depth for `family`.
    pub fn pool_size(&self, family: &str) -> i64 {
        self.pool_size.with_label_values(&[family]).get()
    }

    /// Exhaustion events for `family`.
    pub fn pool_exhausted_count(&self, family: &str) -> u64 {
        self.pool_exhausted.with_label_values(&[family]).get()
    }

    /// Encode all metrics as Prometheus text format.
    pub fn encode(&self) -> Result<String, TelemetryError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(init_err)?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
    }
}

/// Timer guard for automatic histogram observation.
pub struct OperationTimer {
    histogram: Histogram,
    start: Instant,
}

impl OperationTimer {
    fn new(histogram: Histogram) -> Self {
        Self {
            histogram,
            start: Instant::now(),
        }
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}
