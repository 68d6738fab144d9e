//! # Admission Flows
//!
//! The allow-list guards every route; the token bucket guards only the
//! operation routes. Both reject before any cryptographic work happens.

#[cfg(test)]
mod tests {
    use super::super::*;
    use axum::http::{Method, StatusCode};
    use pqc_telemetry::Operation;
    use std::time::Duration;

    const VERIFY_BODY: &str = r#"{"publicKey":"","message":"","signature":""}"#;

    fn config_allowing(entries: &[&str]) -> GatewayConfig {
        let mut config = test_config();
        config.security.allowed_ips = entries.iter().map(|s| s.to_string()).collect();
        config
    }

    async fn verify_as(router: &Router, client: &str) -> TestResponse {
        send(
            router,
            Method::POST,
            "/api/v1/pqc/dsa/verify",
            client,
            Some(VERIFY_BODY),
        )
        .await
    }

    // =========================================================================
    // ALLOW-LIST
    // =========================================================================

    #[tokio::test]
    async fn test_cidr_member_admitted_outsider_denied() {
        let router = gateway(config_allowing(&["10.0.0.0/24"])).router();

        let inside = verify_as(&router, "10.0.0.77").await;
        assert_eq!(inside.status, StatusCode::OK);

        let outside = verify_as(&router, "10.0.1.77").await;
        assert_eq!(outside.status, StatusCode::FORBIDDEN);
        assert_eq!(outside.field("error"), "Access denied");
        assert_eq!(outside.field("message"), "Client address is not whitelisted");
    }

    #[tokio::test]
    async fn test_allow_list_guards_monitoring_routes() {
        let router = gateway(config_allowing(&["127.0.0.1"])).router();

        let denied = send(&router, Method::GET, "/health", "192.0.2.1", None).await;
        assert_eq!(denied.status, StatusCode::FORBIDDEN);

        let allowed = send(&router, Method::GET, "/health", "127.0.0.1", None).await;
        assert_eq!(allowed.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ipv6_network_entry() {
        let router = gateway(config_allowing(&["2001:db8::/32"])).router();

        assert_eq!(verify_as(&router, "2001:db8:1::5").await.status, StatusCode::OK);
        assert_eq!(
            verify_as(&router, "2001:db9::5").await.status,
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_forwarded_for_first_value_is_the_client() {
        let router = gateway(config_allowing(&["203.0.113.0/24"])).router();

        // Peer is a proxy outside the list; the forwarded client is inside
        let response = send_with_headers(
            &router,
            Method::GET,
            "/health",
            "198.51.100.9",
            &[("x-forwarded-for", "203.0.113.4, 198.51.100.9")],
            None,
        )
        .await;
        assert_eq!(response.status, StatusCode::OK);

        let spoofed_tail = send_with_headers(
            &router,
            Method::GET,
            "/health",
            "203.0.113.4",
            &[("x-forwarded-for", "192.0.2.1, 203.0.113.4")],
            None,
        )
        .await;
        assert_eq!(spoofed_tail.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_denied_request_does_no_crypto() {
        let gateway = gateway(config_allowing(&["127.0.0.1"]));
        let router = gateway.router();

        let response = send(
            &router,
            Method::POST,
            "/api/v1/pqc/keys",
            "192.0.2.50",
            Some(r#"{"type":"ML_KEM_768"}"#),
        )
        .await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);

        let metrics = gateway.metrics();
        assert_eq!(metrics.operation_count(Operation::KeyGen), 0);
        assert_eq!(metrics.admission_denied_count("not_whitelisted"), 1);
    }

    // =========================================================================
    // RATE LIMIT
    // =========================================================================

    #[tokio::test]
    async fn test_burst_then_too_many_requests() {
        let gateway = gateway(test_config());
        let router = gateway.router();

        for i in 0..20 {
            let response = verify_as(&router, LOCAL_CLIENT).await;
            assert_eq!(response.status, StatusCode::OK, "request {} rejected", i + 1);
        }

        let limited = verify_as(&router, LOCAL_CLIENT).await;
        assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(limited.field("error"), "Too Many Requests");
        let retry_after: u64 = limited
            .headers
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .expect("Retry-After header");
        assert!(retry_after >= 1);
        assert_eq!(gateway.metrics().admission_denied_count("rate_exceeded"), 1);
    }

    #[tokio::test]
    async fn test_tokens_return_after_window() {
        let router = gateway(test_config()).router();
        for _ in 0..20 {
            let _ = verify_as(&router, LOCAL_CLIENT).await;
        }
        assert_eq!(
            verify_as(&router, LOCAL_CLIENT).await.status,
            StatusCode::TOO_MANY_REQUESTS
        );

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(verify_as(&router, LOCAL_CLIENT).await.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_monitoring_routes_not_rate_limited() {
        let router = gateway(test_config()).router();
        for _ in 0..40 {
            let response = send(&router, Method::GET, "/health", LOCAL_CLIENT, None).await;
            assert_eq!(response.status, StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_clients_limited_independently() {
        let router = gateway(config_allowing(&["10.1.0.0/16"])).router();
        for _ in 0..20 {
            let _ = verify_as(&router, "10.1.0.1").await;
        }
        assert_eq!(
            verify_as(&router, "10.1.0.1").await.status,
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(verify_as(&router, "10.1.0.2").await.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_port_and_mapped_spellings_share_one_bucket() {
        let mut config = config_allowing(&["10.0.0.5"]);
        // One token a minute, so nothing refills during the run
        config.rate_limit.refill_tokens = 1;
        config.rate_limit.window = Duration::from_secs(60);
        config.rate_limit.max_idle = Duration::from_secs(3600);
        let gateway = gateway(config);
        let router = gateway.router();

        let mut admitted = 0;
        for i in 0..60 {
            let forwarded = match i % 3 {
                0 => format!("10.0.0.5:{}", 1000 + i),
                1 => "::ffff:10.0.0.5".to_string(),
                _ => format!("[::ffff:10.0.0.5]:{}", 2000 + i),
            };
            let response = send_with_headers(
                &router,
                Method::POST,
                "/api/v1/pqc/dsa/verify",
                "192.0.2.1",
                &[("x-forwarded-for", forwarded.as_str())],
                Some(VERIFY_BODY),
            )
            .await;
            if response.status == StatusCode::OK {
                admitted += 1;
            } else {
                assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
            }
        }

        assert_eq!(admitted, 20);
        assert_eq!(gateway.pipeline().rate_limiter().bucket_count(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_disabled() {
        let mut config = test_config();
        config.rate_limit.enabled = false;
        let router = gateway(config).router();

        for _ in 0..30 {
            assert_eq!(verify_as(&router, LOCAL_CLIENT).await.status, StatusCode::OK);
        }
    }
}
