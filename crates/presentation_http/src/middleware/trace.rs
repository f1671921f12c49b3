//! Request tracing
//!
//! Every request gets an INFO `request` span, so it passes the default
//! `info` filter and reaches the OpenTelemetry exporter.

use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, HttpMakeClassifier, TraceLayer,
};
use tracing::Level;

/// `TraceLayer` type produced by [`http_trace_layer`]
pub type HttpTraceLayer =
    TraceLayer<HttpMakeClassifier, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse>;

/// Trace layer creating request spans and response events at INFO
pub fn http_trace_layer() -> HttpTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, body::Body, http, routing::get};
    use tower::ServiceExt;
    use tracing::{Subscriber, span};
    use tracing_subscriber::{
        EnvFilter, Layer, layer::Context, layer::SubscriberExt, registry::LookupSpan,
    };

    use super::*;

    #[derive(Clone, Default)]
    struct SpanNames(Arc<Mutex<Vec<String>>>);

    impl<S> Layer<S> for SpanNames
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_new_span(&self, attrs: &span::Attributes<'_>, _id: &span::Id, _ctx: Context<'_, S>) {
            self.0
                .lock()
                .unwrap()
                .push(attrs.metadata().name().to_string());
        }
    }

    #[tokio::test]
    async fn request_span_passes_info_filter() {
        let names = SpanNames::default();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new("info"))
            .with(names.clone());
        let _guard = tracing::subscriber::set_default(subscriber);

        let app = Router::new()
            .route("/todoitems", get(|| async { "[]" }))
            .layer(http_trace_layer());
        let request = http::Request::builder()
            .uri("/todoitems")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), 200);

        let names = names.0.lock().unwrap().clone();
        assert_eq!(names, vec!["request".to_string()]);
    }
}
