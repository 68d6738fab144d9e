//! Request audit middleware.
//!
//! One `api_request` span per request and one completion line carrying
//! client, method, path, status and duration. Bodies are never recorded.

use axum::{
    body::Body,
    http::{Request, Response},
};
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::{info, info_span, Instrument};

use super::client_ip::client_identity;

/// Tracing layer that creates spans for each request
#[derive(Clone, Default)]
pub struct TracingLayer;

impl TracingLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for TracingLayer {
    type Service = TracingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TracingService { inner }
    }
}

/// Tracing service
#[derive(Clone)]
pub struct TracingService<S> {
    inner: S,
}

// Generic over the body: the panic guard beneath re-boxes responses
impl<S, ResBody> Service<Request<Body>> for TracingService<S>
where
    S: Service<Request<Body>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ResBody: 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();

        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let client = client_identity(&req).unwrap_or_else(|| "unknown".to_string());
        let request_id = uuid::Uuid::now_v7();

        let span = info_span!(
            "api_request",
            request_id = %request_id,
            http.method = %method,
            http.target = %path,
        );

        Box::pin(
            async move {
                let start = Instant::now();
                let result = inner.call(req).await;
                let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                if let Ok(response) = &result {
                    info!(
                        client = %client,
                        method = %method,
                        path = %path,
                        status = response.status().as_u16(),
                        duration_ms,
                        "Request completed"
                    );
                }

                result
            }
            .instrument(span),
        )
    }
}
