//! # HTTP Operation Flows
//!
//! Full request paths through the router with the real ML-KEM-768 and
//! ML-DSA-65 primitives:
//!
//! 1. **Key generation → Encapsulate → Decapsulate**: both sides agree on the secret
//! 2. **Key generation → Sign → Verify**: signatures verify, tampering does not
//! 3. **Error surface**: every failure renders the uniform error body

#[cfg(test)]
mod tests {
    use super::super::*;
    use axum::http::{Method, StatusCode};
    use pqc_crypto::{encoding, AlgorithmFamily, ParameterSet};

    fn kem_params() -> ParameterSet {
        PqcryptoProvider::parameter_set(AlgorithmFamily::KeyExchange)
    }

    fn dsa_params() -> ParameterSet {
        PqcryptoProvider::parameter_set(AlgorithmFamily::Signature)
    }

    async fn generate(router: &Router, family: &str) -> (String, String) {
        let response = post_api(router, "/keys", &format!(r#"{{"type":"{}"}}"#, family)).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);
        (response.field("publicKey"), response.field("privateKey"))
    }

    // =========================================================================
    // KEY GENERATION
    // =========================================================================

    #[tokio::test]
    async fn test_generated_key_sizes_match_parameter_sets() {
        let router = gateway(test_config()).router();

        let (pk, sk) = generate(&router, "ML_KEM_768").await;
        assert_eq!(encoding::decode_lenient(&pk).unwrap().len(), kem_params().public_key_bytes);
        assert_eq!(encoding::decode_lenient(&sk).unwrap().len(), kem_params().private_key_bytes);

        let (pk, sk) = generate(&router, "ML_DSA_65").await;
        assert_eq!(encoding::decode_lenient(&pk).unwrap().len(), dsa_params().public_key_bytes);
        assert_eq!(encoding::decode_lenient(&sk).unwrap().len(), dsa_params().private_key_bytes);
    }

    #[tokio::test]
    async fn test_consecutive_key_pairs_differ() {
        let router = gateway(test_config()).router();
        let (first, _) = generate(&router, "ML_KEM_768").await;
        let (second, _) = generate(&router, "ML_KEM_768").await;
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_missing_type_is_validation_error() {
        let router = gateway(test_config()).router();
        let response = post_api(&router, "/keys", "{}").await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.field("error"), "Validation Error");
        assert_eq!(response.field("message"), "Algorithm type is mandatory");
        assert_eq!(response.json()["status"], 400);
        assert!(!response.field("timestamp").is_empty());
    }

    #[tokio::test]
    async fn test_unknown_type_is_malformed_request() {
        let router = gateway(test_config()).router();
        let response = post_api(&router, "/keys", r#"{"type":"RSA_2048"}"#).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.field("error"), "Malformed JSON Request");
    }

    #[tokio::test]
    async fn test_invalid_json_is_malformed_request() {
        let router = gateway(test_config()).router();
        let response = post_api(&router, "/kem/encapsulate", "{not json").await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.field("error"), "Malformed JSON Request");
    }

    // =========================================================================
    // KEM
    // =========================================================================

    #[tokio::test]
    async fn test_kem_roundtrip_over_http() {
        let router = gateway(test_config()).router();
        let (pk, sk) = generate(&router, "ML_KEM_768").await;

        let enc = post_api(&router, "/kem/encapsulate", &format!(r#"{{"publicKey":"{}"}}"#, pk)).await;
        assert_eq!(enc.status, StatusCode::OK, "{}", enc.text);
        let secret = enc.field("sharedSecret");
        let ciphertext = enc.field("ciphertext");
        assert_eq!(
            encoding::decode_lenient(&secret).unwrap().len(),
            kem_params().shared_secret_bytes
        );
        assert_eq!(
            encoding::decode_lenient(&ciphertext).unwrap().len(),
            kem_params().ciphertext_bytes
        );

        let dec = post_api(
            &router,
            "/kem/decapsulate",
            &format!(r#"{{"privateKey":"{}","ciphertext":"{}"}}"#, sk, ciphertext),
        )
        .await;
        assert_eq!(dec.status, StatusCode::OK, "{}", dec.text);
        assert_eq!(dec.field("sharedSecret"), secret);
    }

    #[tokio::test]
    async fn test_encapsulate_missing_key() {
        let router = gateway(test_config()).router();
        let response = post_api(&router, "/kem/encapsulate", "{}").await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.field("error"), "Validation Error");
        assert_eq!(response.field("message"), "publicKey missing");
    }

    #[tokio::test]
    async fn test_encapsulate_wrong_length_key() {
        let router = gateway(test_config()).router();
        let response = post_api(&router, "/kem/encapsulate", r#"{"publicKey":"AAAA"}"#).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.field("error"), "Invalid Key or Parameter Format");
    }

    #[tokio::test]
    async fn test_decapsulate_wrong_length_ciphertext() {
        let router = gateway(test_config()).router();
        let (_, sk) = generate(&router, "ML_KEM_768").await;

        let response = post_api(
            &router,
            "/kem/decapsulate",
            &format!(r#"{{"privateKey":"{}","ciphertext":"AAAA"}}"#, sk),
        )
        .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.field("message"), "Invalid ciphertext");
    }

    // =========================================================================
    // DSA
    // =========================================================================

    #[tokio::test]
    async fn test_sign_verify_over_http() {
        let gateway = gateway(test_config());
        let router = gateway.router();
        let (pk, sk) = generate(&router, "ML_DSA_65").await;

        let signed = post_api(
            &router,
            "/dsa/sign",
            &format!(r#"{{"privateKeyBase64":"{}","message":"transfer 10"}}"#, sk),
        )
        .await;
        assert_eq!(signed.status, StatusCode::OK, "{}", signed.text);
        let signature = signed.field("signature");
        assert_eq!(
            encoding::decode_lenient(&signature).unwrap().len(),
            dsa_params().signature_bytes
        );

        let verify = |message: &str| {
            format!(
                r#"{{"publicKey":"{}","message":"{}","signature":"{}"}}"#,
                pk, message, signature
            )
        };
        let ok = post_api(&router, "/dsa/verify", &verify("transfer 10")).await;
        assert_eq!(ok.json()["valid"], true);

        let tampered = post_api(&router, "/dsa/verify", &verify("transfer 99")).await;
        assert_eq!(tampered.status, StatusCode::OK);
        assert_eq!(tampered.json()["valid"], false);

        let metrics = gateway.metrics();
        assert_eq!(metrics.sign_count(pqc_telemetry::Outcome::Success), 1);
        assert_eq!(metrics.verify_count(pqc_telemetry::Outcome::Success), 1);
        assert_eq!(metrics.verify_count(pqc_telemetry::Outcome::Fail), 1);
    }

    #[tokio::test]
    async fn test_verify_with_garbage_is_false_not_error() {
        let router = gateway(test_config()).router();
        let response = post_api(
            &router,
            "/dsa/verify",
            r#"{"publicKey":"%%%","message":"m","signature":"AAAA"}"#,
        )
        .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json()["valid"], false);

        let empty = post_api(&router, "/dsa/verify", "{}").await;
        assert_eq!(empty.status, StatusCode::OK);
        assert_eq!(empty.json()["valid"], false);
    }

    #[tokio::test]
    async fn test_verify_with_null_fields_is_false_not_error() {
        let router = gateway(test_config()).router();
        for body in [
            r#"{"publicKey":null,"message":"m","signature":"x"}"#,
            r#"{"publicKey":"AAAA","message":null,"signature":null}"#,
        ] {
            let response = post_api(&router, "/dsa/verify", body).await;
            assert_eq!(response.status, StatusCode::OK, "{}", body);
            assert_eq!(response.json()["valid"], false);
        }
    }

    #[tokio::test]
    async fn test_sign_validation_messages() {
        let router = gateway(test_config()).router();

        let missing = post_api(&router, "/dsa/sign", r#"{"message":"m"}"#).await;
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
        assert_eq!(missing.field("message"), "Private key is required");

        let not_base64 =
            post_api(&router, "/dsa/sign", r#"{"privateKeyBase64":"***","message":"m"}"#).await;
        assert_eq!(not_base64.status, StatusCode::BAD_REQUEST);
        assert_eq!(not_base64.field("message"), "Private key must be Base64 encoded");

        let no_message = post_api(&router, "/dsa/sign", r#"{"privateKeyBase64":"AAAA"}"#).await;
        assert_eq!(no_message.status, StatusCode::BAD_REQUEST);
        assert_eq!(no_message.field("message"), "Message to sign is required");
    }

    #[tokio::test]
    async fn test_sign_with_wrong_length_key_is_crypto_failure() {
        let router = gateway(test_config()).router();
        let response = post_api(
            &router,
            "/dsa/sign",
            r#"{"privateKeyBase64":"AAAA","message":"m"}"#,
        )
        .await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.field("error"), "Cryptography Error");
        assert!(!response.text.contains("AAAA"));
    }

    // =========================================================================
    // MONITORING AND LIMITS
    // =========================================================================

    #[tokio::test]
    async fn test_health_and_metrics() {
        let router = gateway(test_config()).router();

        let health = send(&router, Method::GET, "/health", LOCAL_CLIENT, None).await;
        assert_eq!(health.status, StatusCode::OK);
        assert_eq!(health.field("status"), "UP");

        let _ = generate(&router, "ML_KEM_768").await;
        let metrics = send(&router, Method::GET, "/metrics", LOCAL_CLIENT, None).await;
        assert_eq!(metrics.status, StatusCode::OK);
        assert!(metrics.text.contains("pqc_operation_duration_seconds"));
        assert!(metrics.text.contains(r#"operation="keygen""#));
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let mut config = test_config();
        config.limits.max_request_size = 128;
        let router = gateway(config).router();

        let body = format!(r#"{{"publicKey":"{}"}}"#, "A".repeat(512));
        let response = post_api(&router, "/kem/encapsulate", &body).await;
        assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
