//! Request and response bodies.
//!
//! Field names are camelCase on the wire. Requests deserialize every field as
//! optional so that a missing field is a validation error, not a parse error.

use pqc_crypto::{encoding, AlgorithmFamily};
use serde::{Deserialize, Serialize};

use super::error::ApiError;

fn require<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str, ApiError> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::validation(message)),
    }
}

/// `POST /keys`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyGenRequest {
    /// Requested family
    #[serde(rename = "type")]
    pub family: Option<AlgorithmFamily>,
}

impl KeyGenRequest {
    pub fn validate(&self) -> Result<AlgorithmFamily, ApiError> {
        self.family
            .ok_or_else(|| ApiError::validation("Algorithm type is mandatory"))
    }
}

/// `POST /kem/encapsulate`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncapsulateRequest {
    pub public_key: Option<String>,
}

impl EncapsulateRequest {
    pub fn validate(&self) -> Result<&str, ApiError> {
        require(&self.public_key, "publicKey missing")
    }
}

/// `POST /kem/decapsulate`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecapsulateRequest {
    pub private_key: Option<String>,
    pub ciphertext: Option<String>,
}

impl DecapsulateRequest {
    /// Returns `(private_key, ciphertext)`.
    pub fn validate(&self) -> Result<(&str, &str), ApiError> {
        let private_key = require(&self.private_key, "privateKey missing")?;
        let ciphertext = require(&self.ciphertext, "ciphertext missing")?;
        Ok((private_key, ciphertext))
    }
}

/// `POST /dsa/sign`
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    pub private_key_base64: Option<String>,
    pub message: Option<String>,
}

impl std::fmt::Debug for SignRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignRequest").finish_non_exhaustive()
    }
}

impl SignRequest {
    /// Returns `(private_key_base64, message)`.
    pub fn validate(&self) -> Result<(&str, &str), ApiError> {
        let private_key = require(&self.private_key_base64, "Private key is required")?;
        if !encoding::is_base64_alphabet(private_key) {
            return Err(ApiError::validation("Private key must be Base64 encoded"));
        }
        let message = require(&self.message, "Message to sign is required")?;
        Ok((private_key, message))
    }
}

/// `POST /dsa/verify`
///
/// Never rejected for shape: absent or null fields read as empty and fail
/// verification.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifyRequest {
    pub public_key: Option<String>,
    pub message: Option<String>,
    pub signature: Option<String>,
}

impl VerifyRequest {
    pub fn public_key(&self) -> &str {
        self.public_key.as_deref().unwrap_or("")
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }

    pub fn signature(&self) -> &str {
        self.signature.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPairResponse {
    pub public_key: String,
    pub private_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncapsulateResponse {
    pub shared_secret: String,
    pub ciphertext: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecapsulateResponse {
    pub shared_secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignResponse {
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
