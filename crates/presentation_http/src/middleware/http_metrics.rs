//! Request metrics middleware
//!
//! Records count and latency of every routed request, labelled with the
//! route template (e.g. `/todoitems/{id}`) rather than the raw path so the
//! label set stays bounded. Apply with `Router::route_layer`.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

use axum::{
    body::Body,
    extract::{MatchedPath, Request},
    response::Response,
};
use infrastructure::HttpMetrics;
use tower::{Layer, Service};

/// Layer that records request metrics
#[derive(Debug, Clone)]
pub struct HttpMetricsLayer {
    metrics: HttpMetrics,
}

impl HttpMetricsLayer {
    /// Create a layer recording into `metrics`
    #[must_use]
    pub const fn new(metrics: HttpMetrics) -> Self {
        Self { metrics }
    }
}

impl<S> Layer<S> for HttpMetricsLayer {
    type Service = HttpMetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HttpMetricsService {
            inner,
            metrics: self.metrics.clone(),
        }
    }
}

/// Service wrapper produced by [`HttpMetricsLayer`]
#[derive(Debug, Clone)]
pub struct HttpMetricsService<S> {
    inner: S,
    metrics: HttpMetrics,
}

impl<S> Service<Request<Body>> for HttpMetricsService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let started = Instant::now();
        let method = request.method().to_string();
        let route = request
            .extensions()
            .get::<MatchedPath>()
            .map_or_else(|| request.uri().path().to_owned(), |p| p.as_str().to_owned());

        // Take the service that was polled ready, leave a fresh clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let metrics = self.metrics.clone();

        Box::pin(async move {
            let response = inner.call(request).await?;
            metrics.record(&method, &route, response.status().as_u16(), started.elapsed());
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, http, routing::get};
    use infrastructure::{AppIdentity, telemetry::build_prometheus_recorder};
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn records_route_template() {
        let recorder = build_prometheus_recorder(&AppIdentity::default()).unwrap();
        let handle = recorder.handle();

        let app = Router::new()
            .route("/items/{id}", get(|| async { "ok" }))
            .route_layer(HttpMetricsLayer::new(HttpMetrics::new()));

        let request = http::Request::builder()
            .uri("/items/42")
            .body(Body::empty())
            .unwrap();

        let _guard = metrics::set_default_local_recorder(&recorder);
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), 200);

        let output = handle.render();
        assert!(output.contains("route=\"/items/{id}\""));
        assert!(!output.contains("/items/42"));
    }
}
