//! Base64 at the edges.
//!
//! Clients paste keys out of PEM-ish blobs, so decoding drops ASCII
//! whitespace (including line breaks) before handing off to the engine.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::CryptoError;

/// Encode bytes as standard padded Base64.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard Base64, ignoring embedded whitespace.
pub fn decode_lenient(input: &str) -> Result<Vec<u8>, CryptoError> {
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(sanitized.as_bytes())
        .map_err(|_| CryptoError::InvalidEncoding)
}

/// True when `input` uses only the standard alphabet, padding and whitespace.
pub fn is_base64_alphabet(input: &str) -> bool {
    input
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=') || c.is_ascii_whitespace())
}
