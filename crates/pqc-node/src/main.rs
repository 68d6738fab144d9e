//! # PQC Node
//!
//! Entry point for the post-quantum crypto gateway.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging from `PQC_*` / `RUST_LOG`
//! 2. Load configuration (TOML file named by `PQC_CONFIG`, then env overrides)
//! 3. Validate; any bad allow-list entry or limit aborts startup
//! 4. Prime key pools, start background tasks, serve
//! 5. On Ctrl+C, drain in-flight requests and stop

use std::sync::Arc;

use anyhow::{Context, Result};
use pqc_crypto::PqcryptoProvider;
use pqc_gateway::{GatewayConfig, PqcGatewayService};
use pqc_telemetry::{init_logging, TelemetryConfig};
use tracing::{error, info};

/// Load configuration from an optional file and the environment.
fn load_config<F>(lookup: F) -> Result<GatewayConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match lookup("PQC_CONFIG") {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config file {}", path))?;
            let config = GatewayConfig::from_toml_str(&text)
                .with_context(|| format!("failed to parse config file {}", path))?;
            info!(path = %path, "Loaded configuration file");
            config
        }
        None => GatewayConfig::default(),
    };

    config
        .apply_overrides(&lookup)
        .context("invalid environment override")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_logging(&telemetry).context("failed to initialize logging")?;

    let config = load_config(|key| std::env::var(key).ok())?;
    info!(
        service = %telemetry.service_name,
        addr = %config.http_addr(),
        allowed = config.security.allowed_ips.len(),
        "Configuration loaded"
    );

    let service = Arc::new(
        PqcGatewayService::new(config, Arc::new(PqcryptoProvider::new()))
            .context("refusing to start")?,
    );

    let mut server = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.start().await })
    };

    let joined = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for Ctrl+C")?;
            info!("Ctrl+C received, shutting down");
            service.shutdown();
            server.await
        }
        // Server stopped on its own, e.g. the bind failed
        joined = &mut server => joined,
    };

    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            error!(error = %e, "Gateway stopped with error");
            Err(e.into())
        }
        Err(e) => Err(anyhow::anyhow!("gateway task failed: {}", e)),
    }
}
