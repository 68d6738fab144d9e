//! Test doubles.

use pqc_crypto::{AlgorithmFamily, CryptoError, Encapsulation, KeyPair, PqcProvider};
use std::sync::atomic::{AtomicU64, Ordering};
use zeroize::Zeroizing;

/// Cheap provider that numbers every generated pair.
///
/// Public keys are the big-endian counter, so generation order is visible in
/// byte order. Only key generation is meaningful; the other operations reject
/// everything.
#[derive(Debug, Default)]
pub struct FakeProvider {
    counter: AtomicU64,
}

impl FakeProvider {
    /// Number of pairs generated so far.
    pub fn generated(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

impl PqcProvider for FakeProvider {
    fn generate_key_pair(&self, family: AlgorithmFamily) -> KeyPair {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        KeyPair::new(family, n.to_be_bytes().to_vec(), vec![0xA5; 8])
    }

    fn encapsulate(&self, _public_key: &[u8]) -> Result<Encapsulation, CryptoError> {
        Err(CryptoError::OperationFailed("fake".into()))
    }

    fn decapsulate(
        &self,
        _private_key: &[u8],
        _ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        Err(CryptoError::OperationFailed("fake".into()))
    }

    fn sign(&self, _private_key: &[u8], _message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Err(CryptoError::OperationFailed("fake".into()))
    }

    fn verify(
        &self,
        _public_key: &[u8],
        _message: &[u8],
        _signature: &[u8],
    ) -> Result<bool, CryptoError> {
        Err(CryptoError::OperationFailed("fake".into()))
    }
}
