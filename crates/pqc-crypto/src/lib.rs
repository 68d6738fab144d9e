//! # PQC Crypto - Post-Quantum Primitives
//!
//! Key material types and the provider port consumed by the gateway.
//!
//! ## Components
//!
//! | Module | Contents | Use Case |
//! |--------|----------|----------|
//! | `family` | `AlgorithmFamily`, `ParameterSet` | Fixed parameterisation per family |
//! | `keys` | `KeyPair`, `Encapsulation` | Owned key material |
//! | `provider` | `PqcProvider`, `PqcryptoProvider` | Keygen, KEM, signatures |
//! | `encoding` | Base64 helpers | Text encoding at the edges |
//!
//! ## Algorithms
//!
//! - **ML-KEM-768** (FIPS 203): key encapsulation, NIST security level 3
//! - **ML-DSA-65** (FIPS 204): detached signatures, NIST security level 3
//!
//! ## Security Properties
//!
//! - Private keys and shared secrets are zeroized on drop
//! - `KeyPair` is move-only; `Debug` never prints private material
//! - Randomness is drawn by the primitive library from the OS

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encoding;
pub mod errors;
pub mod family;
pub mod keys;
pub mod provider;

// Re-exports
pub use errors::CryptoError;
pub use family::{AlgorithmFamily, ParameterSet};
pub use keys::{Encapsulation, KeyPair};
pub use provider::{PqcProvider, PqcryptoProvider};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
