//! # Key Material
//!
//! `KeyPair` owns its bytes outright. It is deliberately not `Clone`: a pair
//! handed out of the pool cannot be aliased or dispensed twice.

use std::fmt;
use zeroize::Zeroizing;

use crate::AlgorithmFamily;

/// Public/private key pair tagged with its family.
pub struct KeyPair {
    family: AlgorithmFamily,
    public_key: Vec<u8>,
    private_key: Zeroizing<Vec<u8>>,
}

impl KeyPair {
    /// Wrap freshly generated key material.
    pub fn new(family: AlgorithmFamily, public_key: Vec<u8>, private_key: Vec<u8>) -> Self {
        Self {
            family,
            public_key,
            private_key: Zeroizing::new(private_key),
        }
    }

    /// Family this pair belongs to.
    pub fn family(&self) -> AlgorithmFamily {
        self.family
    }

    /// Encoded public key.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Encoded private key.
    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("family", &self.family)
            .field("public_key_len", &self.public_key.len())
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Result of a KEM encapsulation.
pub struct Encapsulation {
    /// Derived shared secret
    pub shared_secret: Zeroizing<Vec<u8>>,
    /// Ciphertext to send to the key holder
    pub ciphertext: Vec<u8>,
}

impl fmt::Debug for Encapsulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encapsulation")
            .field("shared_secret", &"<redacted>")
            .field("ciphertext_len", &self.ciphertext.len())
            .finish()
    }
}
