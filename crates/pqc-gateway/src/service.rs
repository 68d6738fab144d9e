//! Gateway service - construction, startup and shutdown.

use axum::Router;
use pqc_crypto::PqcProvider;
use pqc_telemetry::PqcMetrics;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::domain::cidr::AllowList;
use crate::domain::config::{ConfigError, GatewayConfig};
use crate::domain::error::GatewayError;
use crate::middleware::{AdmissionPipeline, RateLimitState};
use crate::operations::CryptoOperationService;
use crate::pool::KeyPoolManager;
use crate::router::{build_router, AppState};
use crate::scheduler::spawn_fixed_delay;

/// Post-quantum gateway service
pub struct PqcGatewayService {
    config: GatewayConfig,
    metrics: Arc<PqcMetrics>,
    pool: Arc<KeyPoolManager>,
    operations: Arc<CryptoOperationService>,
    pipeline: Arc<AdmissionPipeline>,
    shutdown_tx: watch::Sender<bool>,
}

impl PqcGatewayService {
    /// Validate `config` and build every component. Pools start empty.
    pub fn new(config: GatewayConfig, provider: Arc<dyn PqcProvider>) -> Result<Self, GatewayError> {
        config.validate()?;

        let allow_list =
            AllowList::parse(&config.security.allowed_ips).map_err(ConfigError::from)?;
        let metrics = Arc::new(PqcMetrics::new()?);

        let pool = Arc::new(KeyPoolManager::new(
            Arc::clone(&provider),
            &config.pool,
            Arc::clone(&metrics),
        ));
        let operations = Arc::new(CryptoOperationService::new(
            Arc::clone(&pool),
            provider,
            Arc::clone(&metrics),
        ));
        let pipeline = Arc::new(AdmissionPipeline::new(
            allow_list,
            Arc::new(RateLimitState::new(&config.rate_limit)),
            Arc::clone(&metrics),
        ));

        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            config,
            metrics,
            pool,
            operations,
            pipeline,
            shutdown_tx,
        })
    }

    /// Router with the full middleware stack.
    pub fn router(&self) -> Router {
        let state = AppState {
            operations: Arc::clone(&self.operations),
            pool: Arc::clone(&self.pool),
            metrics: Arc::clone(&self.metrics),
        };
        build_router(state, Arc::clone(&self.pipeline), &self.config.limits)
    }

    /// Bind the configured address and serve until [`shutdown`](Self::shutdown).
    pub async fn start(&self) -> Result<(), GatewayError> {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{}: {}", addr, e)))?;
        self.serve(listener).await
    }

    /// Prime the pools, start background tasks and serve on `listener`.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), GatewayError> {
        info!("Starting PQC gateway...");

        let pool = Arc::clone(&self.pool);
        let report = tokio::task::spawn_blocking(move || pool.refill())
            .await
            .map_err(|e| GatewayError::Internal(format!("pool priming failed: {}", e)))?;
        info!(
            kem = report.kem_generated,
            dsa = report.dsa_generated,
            "Key pools primed"
        );

        let pool = Arc::clone(&self.pool);
        let refill_task = spawn_fixed_delay(
            "pool-refill",
            self.config.pool.refill_interval,
            self.shutdown_tx.subscribe(),
            move || {
                pool.refill();
            },
        );

        let limiter = Arc::clone(self.pipeline.rate_limiter());
        let max_idle = self.config.rate_limit.max_idle;
        let sweep_task = spawn_fixed_delay(
            "rate-bucket-sweep",
            self.config.rate_limit.cleanup_interval,
            self.shutdown_tx.subscribe(),
            move || {
                let removed = limiter.cleanup(max_idle);
                if removed > 0 {
                    debug!(removed, remaining = limiter.bucket_count(), "Evicted idle rate buckets");
                }
            },
        );

        let local_addr = listener
            .local_addr()
            .map_err(|e| GatewayError::Bind(e.to_string()))?;
        info!(addr = %local_addr, "PQC gateway listening");

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let result = axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.wait_for(|stop| *stop).await;
            info!("Received shutdown signal");
        })
        .await;

        // Server gone for whatever reason: stop the background tasks too
        self.shutdown_tx.send_replace(true);
        let _ = refill_task.await;
        let _ = sweep_task.await;

        info!("PQC gateway stopped");
        result.map_err(|e| GatewayError::Serve(e.to_string()))
    }

    /// Trigger graceful shutdown
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Configuration in effect
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Get metrics
    pub fn metrics(&self) -> Arc<PqcMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Key pools
    pub fn pool(&self) -> Arc<KeyPoolManager> {
        Arc::clone(&self.pool)
    }

    /// Admission pipeline
    pub fn pipeline(&self) -> Arc<AdmissionPipeline> {
        Arc::clone(&self.pipeline)
    }

    /// Operation service
    pub fn operations(&self) -> Arc<CryptoOperationService> {
        Arc::clone(&self.operations)
    }
}
