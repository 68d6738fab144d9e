//! # PQC Gateway Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── mod.rs             # Shared harness: gateway builder, request helpers
//!     ├── http_flows.rs      # Key generation, KEM and DSA over HTTP
//!     ├── admission_flows.rs # Allow-list and rate limiting end to end
//!     └── pool_flows.rs      # Pool priming, exhaustion and refill
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p pqc-tests
//! cargo test -p pqc-tests integration::admission_flows::
//! ```
