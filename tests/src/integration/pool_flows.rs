//! # Key Pool Flows
//!
//! Key generation requests drain the pool FIFO; an empty pool falls back to
//! synchronous generation and is topped up again by the refill pass.

#[cfg(test)]
mod tests {
    use super::super::*;
    use axum::http::{Method, StatusCode};
    use pqc_crypto::AlgorithmFamily;

    #[tokio::test]
    async fn test_keygen_drains_pool_then_falls_back() {
        let gateway = gateway(test_config());
        let router = gateway.router();
        let pool = gateway.pool();

        pool.refill();
        assert_eq!(pool.size(AlgorithmFamily::KeyExchange), 2);
        assert_eq!(pool.size(AlgorithmFamily::Signature), 2);

        for expected in [1, 0] {
            let response = post_api(&router, "/keys", r#"{"type":"ML_KEM_768"}"#).await;
            assert_eq!(response.status, StatusCode::OK);
            assert_eq!(pool.size(AlgorithmFamily::KeyExchange), expected);
        }

        // Empty pool still serves
        let response = post_api(&router, "/keys", r#"{"type":"ML_KEM_768"}"#).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(pool.size(AlgorithmFamily::KeyExchange), 0);
        assert_eq!(pool.size(AlgorithmFamily::Signature), 2);
        assert_eq!(gateway.metrics().pool_exhausted_count("kem"), 1);
    }

    #[tokio::test]
    async fn test_refill_restores_targets_and_status_route_reports_it() {
        let gateway = gateway(test_config());
        let router = gateway.router();
        let pool = gateway.pool();

        pool.refill();
        let _ = post_api(&router, "/keys", r#"{"type":"ML_DSA_65"}"#).await;
        assert_eq!(pool.size(AlgorithmFamily::Signature), 1);

        let report = pool.refill();
        assert_eq!(report.dsa_generated, 1);
        assert_eq!(report.kem_generated, 0);

        let status = send(&router, Method::GET, "/pool", LOCAL_CLIENT, None).await;
        assert_eq!(status.status, StatusCode::OK);
        assert_eq!(status.json()["kemPoolSize"], 2);
        assert_eq!(status.json()["dsaPoolSize"], 2);
    }

    #[tokio::test]
    async fn test_pooled_pair_is_usable() {
        let gateway = gateway(test_config());
        let router = gateway.router();
        gateway.pool().refill();

        let keys = post_api(&router, "/keys", r#"{"type":"ML_DSA_65"}"#).await;
        let signed = post_api(
            &router,
            "/dsa/sign",
            &format!(
                r#"{{"privateKeyBase64":"{}","message":"pooled"}}"#,
                keys.field("privateKey")
            ),
        )
        .await;
        let verified = post_api(
            &router,
            "/dsa/verify",
            &format!(
                r#"{{"publicKey":"{}","message":"pooled","signature":"{}"}}"#,
                keys.field("publicKey"),
                signed.field("signature")
            ),
        )
        .await;
        assert_eq!(verified.json()["valid"], true);
    }
}
