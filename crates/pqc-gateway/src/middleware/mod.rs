//! Middleware stack for the gateway.
//!
//! Layer order: Request → Tracing → CatchPanic → AllowList → BodyLimit → [RateLimit, operation routes only] → Handler

pub mod admission;
pub mod allowlist;
pub mod client_ip;
pub mod rate_limit;
pub mod tracing;

pub use admission::{AdmissionPipeline, Denial, PerimeterTrust};
pub use allowlist::AllowListLayer;
pub use client_ip::client_identity;
pub use rate_limit::{RateLimitLayer, RateLimitState};
pub use tracing::TracingLayer;
