//! PQC Gateway - ML-KEM-768 / ML-DSA-65 operations over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          PQC GATEWAY                             │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  Tracing → CatchPanic → AllowList ──────────┬──── /health        │
//! │                                             ├──── /metrics       │
//! │                                             ├──── /pool          │
//! │                                             └─ RateLimit         │
//! │                                                  │               │
//! │                                      /api/v1/pqc/{keys,kem,dsa}  │
//! │                                                  │               │
//! │                                    CryptoOperationService        │
//! │                                      │                 │         │
//! │                              KeyPoolManager       PqcProvider    │
//! │                              (kem + dsa FIFO)                    │
//! │                                      ▲                           │
//! │                           fixed-delay refill task                │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use pqc_gateway::{GatewayConfig, PqcGatewayService};
//! use pqc_crypto::PqcryptoProvider;
//!
//! let service = PqcGatewayService::new(GatewayConfig::default(), Arc::new(PqcryptoProvider::new()))?;
//! service.start().await?;
//! ```
//!
//! # Security
//!
//! - Allow-list entries are parsed at startup; a bad entry stops the process
//! - Admission runs before any cryptographic work
//! - Private keys, shared secrets and messages are never logged

pub mod domain;
pub mod middleware;
pub mod operations;
pub mod pool;
pub mod router;
pub mod scheduler;
pub mod service;

#[cfg(test)]
mod test_support;

// Re-exports
pub use domain::cidr::{matches, AllowList, AllowListEntry, ConfigurationError};
pub use domain::config::{ConfigError, GatewayConfig};
pub use domain::error::{ApiError, GatewayError};
pub use middleware::{AdmissionPipeline, Denial, PerimeterTrust, RateLimitState};
pub use operations::{CryptoOperationService, OperationError};
pub use pool::{KeyPoolManager, PoolStatus, RefillReport};
pub use router::{build_router, AppState, API_PREFIX};
pub use scheduler::spawn_fixed_delay;
pub use service::PqcGatewayService;
