//! Domain layer: configuration, allow-list parsing, error model, wire types.

pub mod cidr;
pub mod config;
pub mod error;
pub mod types;

pub use cidr::{client_address, AllowList, AllowListEntry, ConfigurationError};
pub use config::{ConfigError, GatewayConfig};
pub use error::{ApiError, ApiResult, GatewayError};
