//! # Crypto Operation Service
//!
//! Stateless operations over caller-supplied material. Inputs arrive as
//! Base64 text and are decoded here; outputs are raw bytes for the transport
//! layer to encode.
//!
//! Every call holds an [`OperationTimer`](pqc_telemetry::OperationTimer) for
//! its whole body, so the duration is recorded on every exit path.
//!
//! Private keys, shared secrets and messages never appear in logs or errors.

use pqc_crypto::{encoding, AlgorithmFamily, CryptoError, Encapsulation, KeyPair, PqcProvider};
use pqc_telemetry::{Operation, Outcome, PqcMetrics};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::error::ApiError;
use crate::pool::KeyPoolManager;

/// Typed operation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// Key or signature material unusable for the family
    #[error("invalid key format: {0}")]
    InvalidKeyFormat(&'static str),

    /// Ciphertext unusable for the family
    #[error("invalid ciphertext")]
    InvalidCiphertext,

    /// The primitive rejected input that looked valid
    #[error("cryptographic operation failed")]
    CryptoOperation,
}

impl From<OperationError> for ApiError {
    fn from(e: OperationError) -> Self {
        match e {
            OperationError::InvalidKeyFormat(what) => {
                ApiError::invalid_format(format!("Invalid {}", what))
            }
            OperationError::InvalidCiphertext => ApiError::invalid_format("Invalid ciphertext"),
            OperationError::CryptoOperation => ApiError::crypto_failure(),
        }
    }
}

fn decode(input: &str, what: &'static str) -> Result<Zeroizing<Vec<u8>>, OperationError> {
    encoding::decode_lenient(input)
        .map(Zeroizing::new)
        .map_err(|_| OperationError::InvalidKeyFormat(what))
}

/// Key generation, KEM and signature operations.
pub struct CryptoOperationService {
    pool: Arc<KeyPoolManager>,
    provider: Arc<dyn PqcProvider>,
    metrics: Arc<PqcMetrics>,
}

impl CryptoOperationService {
    pub fn new(
        pool: Arc<KeyPoolManager>,
        provider: Arc<dyn PqcProvider>,
        metrics: Arc<PqcMetrics>,
    ) -> Self {
        Self {
            pool,
            provider,
            metrics,
        }
    }

    /// Hand out a key pair, from the pool when one is available.
    pub fn generate_keys(&self, family: AlgorithmFamily) -> KeyPair {
        let _timer = self.metrics.start_timer(Operation::KeyGen);
        self.pool.borrow(family)
    }

    /// Encapsulate against a Base64 ML-KEM public key.
    pub fn encapsulate(&self, public_key: &str) -> Result<Encapsulation, OperationError> {
        let _timer = self.metrics.start_timer(Operation::Encapsulate);

        let public_key = decode(public_key, "public key")?;
        self.provider
            .encapsulate(&public_key)
            .map_err(|e| match e {
                CryptoError::InvalidPublicKey { .. } | CryptoError::InvalidEncoding => {
                    OperationError::InvalidKeyFormat("public key")
                }
                _ => OperationError::CryptoOperation,
            })
    }

    /// Recover a shared secret from Base64 private key and ciphertext.
    pub fn decapsulate(
        &self,
        private_key: &str,
        ciphertext: &str,
    ) -> Result<Zeroizing<Vec<u8>>, OperationError> {
        let _timer = self.metrics.start_timer(Operation::Decapsulate);

        let private_key = decode(private_key, "private key")?;
        let ciphertext =
            encoding::decode_lenient(ciphertext).map_err(|_| OperationError::InvalidCiphertext)?;

        self.provider
            .decapsulate(&private_key, &ciphertext)
            .map_err(|e| match e {
                CryptoError::InvalidPrivateKey { .. } | CryptoError::InvalidEncoding => {
                    OperationError::InvalidKeyFormat("private key")
                }
                CryptoError::InvalidCiphertext { .. } => OperationError::InvalidCiphertext,
                _ => OperationError::CryptoOperation,
            })
    }

    /// Sign `message` with a Base64 ML-DSA private key.
    ///
    /// A key that does not decode is a format error; a decoded key the
    /// primitive refuses is an operation failure. Both count as `fail`.
    pub fn sign(&self, private_key: &str, message: &[u8]) -> Result<Vec<u8>, OperationError> {
        let _timer = self.metrics.start_timer(Operation::Sign);
        debug!("Sign request received");

        let result = decode(private_key, "private key").and_then(|sk| {
            self.provider
                .sign(&sk, message)
                .map_err(|_| OperationError::CryptoOperation)
        });

        self.metrics.record_sign(match result {
            Ok(_) => Outcome::Success,
            Err(_) => Outcome::Fail,
        });
        result
    }

    /// Verify a detached signature. Malformed input is simply `false`.
    pub fn verify(&self, public_key: &str, message: &[u8], signature: &str) -> bool {
        let _timer = self.metrics.start_timer(Operation::Verify);
        debug!("Verify request received");

        let valid = match (
            encoding::decode_lenient(public_key),
            encoding::decode_lenient(signature),
        ) {
            (Ok(pk), Ok(sig)) => self
                .provider
                .verify(&pk, message, &sig)
                .unwrap_or(false),
            _ => false,
        };

        self.metrics.record_verify(if valid {
            Outcome::Success
        } else {
            Outcome::Fail
        });
        valid
    }
}
