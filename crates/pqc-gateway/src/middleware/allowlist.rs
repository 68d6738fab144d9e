//! Allow-list enforcement middleware.
//!
//! Wraps every route. A request that passes carries a [`PerimeterTrust`]
//! extension downstream; one that fails gets a 403 without reaching a handler.

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower::{Layer, Service};

use super::admission::{AdmissionPipeline, PerimeterTrust};
use super::client_ip::client_identity;

/// Allow-list layer
#[derive(Clone)]
pub struct AllowListLayer {
    pipeline: Arc<AdmissionPipeline>,
}

impl AllowListLayer {
    pub fn new(pipeline: Arc<AdmissionPipeline>) -> Self {
        Self { pipeline }
    }
}

impl<S> Layer<S> for AllowListLayer {
    type Service = AllowListService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AllowListService {
            inner,
            pipeline: Arc::clone(&self.pipeline),
        }
    }
}

/// Allow-list service
#[derive(Clone)]
pub struct AllowListService<S> {
    inner: S,
    pipeline: Arc<AdmissionPipeline>,
}

impl<S> Service<Request<Body>> for AllowListService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let pipeline = Arc::clone(&self.pipeline);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let client = client_identity(&req);
            match pipeline.check_allow_list(client.as_deref()) {
                Ok(trust) => {
                    req.extensions_mut().insert::<PerimeterTrust>(trust);
                    inner.call(req).await
                }
                Err(denial) => Ok(denial.into_response()),
            }
        })
    }
}
