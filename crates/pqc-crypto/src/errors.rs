//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
///
/// Messages carry lengths and kinds only, never key, secret or message bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Public key has the wrong length for the family
    #[error("Invalid public key: expected {expected} bytes, got {actual}")]
    InvalidPublicKey {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Private key has the wrong length for the family
    #[error("Invalid private key: expected {expected} bytes, got {actual}")]
    InvalidPrivateKey {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Ciphertext has the wrong length
    #[error("Invalid ciphertext: expected {expected} bytes, got {actual}")]
    InvalidCiphertext {
        /// Expected ciphertext length in bytes
        expected: usize,
        /// Actual ciphertext length in bytes
        actual: usize,
    },

    /// Signature has the wrong length
    #[error("Invalid signature format: expected {expected} bytes, got {actual}")]
    InvalidSignatureFormat {
        /// Expected signature length in bytes
        expected: usize,
        /// Actual signature length in bytes
        actual: usize,
    },

    /// Input is not valid Base64
    #[error("Invalid Base64 encoding")]
    InvalidEncoding,

    /// The primitive rejected otherwise well-formed input
    #[error("Operation failed: {0}")]
    OperationFailed(String),
}
