//! # Primitive Provider Port
//!
//! The gateway never touches lattice arithmetic directly. Everything goes
//! through [`PqcProvider`], implemented for production by
//! [`PqcryptoProvider`] on top of the PQClean-derived `pqcrypto-*` crates.
//!
//! Length checks happen here, before any bytes reach the primitive, so that a
//! malformed input is reported as a typed error instead of a primitive fault.

use pqcrypto_mldsa::mldsa65;
use pqcrypto_mlkem::mlkem768;
use pqcrypto_traits::kem::{
    Ciphertext as _, PublicKey as _, SecretKey as _, SharedSecret as _,
};
use pqcrypto_traits::sign::{
    DetachedSignature as _, PublicKey as _, SecretKey as _,
};
use zeroize::Zeroizing;

use crate::{AlgorithmFamily, CryptoError, Encapsulation, KeyPair, ParameterSet};

/// Cryptographic primitives for both families.
///
/// Implementations must be safe to call from many worker threads at once.
pub trait PqcProvider: Send + Sync {
    /// Generate a fresh key pair for `family`.
    fn generate_key_pair(&self, family: AlgorithmFamily) -> KeyPair;

    /// Derive a shared secret and ciphertext for a KEM public key.
    fn encapsulate(&self, public_key: &[u8]) -> Result<Encapsulation, CryptoError>;

    /// Recover the shared secret from a ciphertext with the KEM private key.
    fn decapsulate(
        &self,
        private_key: &[u8],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError>;

    /// Produce a detached signature over `message`.
    fn sign(&self, private_key: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Check a detached signature.
    ///
    /// `Ok(false)` is a well-formed signature that does not verify; `Err` is
    /// reserved for malformed key or signature encodings.
    fn verify(
        &self,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, CryptoError>;
}

/// ML-KEM-768 / ML-DSA-65 provider backed by `pqcrypto-mlkem` and `pqcrypto-mldsa`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PqcryptoProvider;

impl PqcryptoProvider {
    /// Create the provider.
    pub fn new() -> Self {
        Self
    }

    /// Byte lengths for a family, as reported by the primitive crate.
    pub fn parameter_set(family: AlgorithmFamily) -> ParameterSet {
        match family {
            AlgorithmFamily::KeyExchange => ParameterSet {
                public_key_bytes: mlkem768::public_key_bytes(),
                private_key_bytes: mlkem768::secret_key_bytes(),
                ciphertext_bytes: mlkem768::ciphertext_bytes(),
                shared_secret_bytes: mlkem768::shared_secret_bytes(),
                signature_bytes: 0,
            },
            AlgorithmFamily::Signature => ParameterSet {
                public_key_bytes: mldsa65::public_key_bytes(),
                private_key_bytes: mldsa65::secret_key_bytes(),
                ciphertext_bytes: 0,
                shared_secret_bytes: 0,
                signature_bytes: mldsa65::signature_bytes(),
            },
        }
    }
}

impl PqcProvider for PqcryptoProvider {
    fn generate_key_pair(&self, family: AlgorithmFamily) -> KeyPair {
        match family {
            AlgorithmFamily::KeyExchange => {
                let (pk, sk) = mlkem768::keypair();
                KeyPair::new(family, pk.as_bytes().to_vec(), sk.as_bytes().to_vec())
            }
            AlgorithmFamily::Signature => {
                let (pk, sk) = mldsa65::keypair();
                KeyPair::new(family, pk.as_bytes().to_vec(), sk.as_bytes().to_vec())
            }
        }
    }

    fn encapsulate(&self, public_key: &[u8]) -> Result<Encapsulation, CryptoError> {
        let expected = mlkem768::public_key_bytes();
        let invalid = || CryptoError::InvalidPublicKey {
            expected,
            actual: public_key.len(),
        };
        if public_key.len() != expected {
            return Err(invalid());
        }
        let pk = mlkem768::PublicKey::from_bytes(public_key).map_err(|_| invalid())?;

        let (shared_secret, ciphertext) = mlkem768::encapsulate(&pk);
        Ok(Encapsulation {
            shared_secret: Zeroizing::new(shared_secret.as_bytes().to_vec()),
            ciphertext: ciphertext.as_bytes().to_vec(),
        })
    }

    fn decapsulate(
        &self,
        private_key: &[u8],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let sk_len = mlkem768::secret_key_bytes();
        let invalid_key = || CryptoError::InvalidPrivateKey {
            expected: sk_len,
            actual: private_key.len(),
        };
        if private_key.len() != sk_len {
            return Err(invalid_key());
        }

        let ct_len = mlkem768::ciphertext_bytes();
        let invalid_ct = || CryptoError::InvalidCiphertext {
            expected: ct_len,
            actual: ciphertext.len(),
        };
        if ciphertext.len() != ct_len {
            return Err(invalid_ct());
        }

        let sk = mlkem768::SecretKey::from_bytes(private_key).map_err(|_| invalid_key())?;
        let ct = mlkem768::Ciphertext::from_bytes(ciphertext).map_err(|_| invalid_ct())?;

        let shared_secret = mlkem768::decapsulate(&ct, &sk);
        Ok(Zeroizing::new(shared_secret.as_bytes().to_vec()))
    }

    fn sign(&self, private_key: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let expected = mldsa65::secret_key_bytes();
        let invalid = || CryptoError::InvalidPrivateKey {
            expected,
            actual: private_key.len(),
        };
        if private_key.len() != expected {
            return Err(invalid());
        }
        let sk = mldsa65::SecretKey::from_bytes(private_key).map_err(|_| invalid())?;

        let signature = mldsa65::detached_sign(message, &sk);
        Ok(signature.as_bytes().to_vec())
    }

    fn verify(
        &self,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, CryptoError> {
        let pk_len = mldsa65::public_key_bytes();
        let invalid_key = || CryptoError::InvalidPublicKey {
            expected: pk_len,
            actual: public_key.len(),
        };
        if public_key.len() != pk_len {
            return Err(invalid_key());
        }

        let sig_len = mldsa65::signature_bytes();
        let invalid_sig = || CryptoError::InvalidSignatureFormat {
            expected: sig_len,
            actual: signature.len(),
        };
        if signature.len() != sig_len {
            return Err(invalid_sig());
        }

        let pk = mldsa65::PublicKey::from_bytes(public_key).map_err(|_| invalid_key())?;
        let sig = mldsa65::DetachedSignature::from_bytes(signature).map_err(|_| invalid_sig())?;

        Ok(mldsa65::verify_detached_signature(&sig, message, &pk).is_ok())
    }
}
