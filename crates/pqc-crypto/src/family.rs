//! # Algorithm Families
//!
//! Exactly two families are served, each pinned to one parameter set:
//!
//! | Family | Algorithm | Wire name |
//! |--------|-----------|-----------|
//! | `KeyExchange` | ML-KEM-768 | `ML_KEM_768` |
//! | `Signature` | ML-DSA-65 | `ML_DSA_65` |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of supported algorithm families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgorithmFamily {
    /// ML-KEM-768 key encapsulation (NIST level 3)
    #[serde(rename = "ML_KEM_768")]
    KeyExchange,
    /// ML-DSA-65 signatures (NIST level 3)
    #[serde(rename = "ML_DSA_65")]
    Signature,
}

impl AlgorithmFamily {
    /// Every family, in pool order.
    pub const ALL: [AlgorithmFamily; 2] = [AlgorithmFamily::KeyExchange, AlgorithmFamily::Signature];

    /// Short label for logs and metric labels.
    pub fn label(&self) -> &'static str {
        match self {
            Self::KeyExchange => "kem",
            Self::Signature => "dsa",
        }
    }

    /// Standard algorithm name.
    pub fn algorithm(&self) -> &'static str {
        match self {
            Self::KeyExchange => "ML-KEM-768",
            Self::Signature => "ML-DSA-65",
        }
    }
}

impl fmt::Display for AlgorithmFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.algorithm())
    }
}

/// Byte lengths implied by a family's parameter set.
///
/// `ciphertext_bytes` and `shared_secret_bytes` are zero for signatures,
/// `signature_bytes` is zero for key exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSet {
    /// Encoded public key length
    pub public_key_bytes: usize,
    /// Encoded private key length
    pub private_key_bytes: usize,
    /// KEM ciphertext length
    pub ciphertext_bytes: usize,
    /// KEM shared secret length
    pub shared_secret_bytes: usize,
    /// Detached signature length
    pub signature_bytes: usize,
}
