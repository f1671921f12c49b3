//! Route definitions

use axum::{Router, routing::get};

use crate::{handlers, middleware::HttpMetricsLayer, openapi, state::AppState};

/// Create the main router with all routes
///
/// Swagger UI is mounted when `server.api_docs_enabled` is set.
pub fn create_router(state: AppState) -> Router {
    let api_docs_enabled = state.config.server.api_docs_enabled;
    let metrics_layer = HttpMetricsLayer::new(state.http_metrics.clone());

    let router = Router::new()
        // Todo API
        .route(
            "/todoitems",
            get(handlers::todos::list_todos).post(handlers::todos::create_todo),
        )
        .route(
            "/todoitems/complete",
            get(handlers::todos::list_completed_todos),
        )
        .route(
            "/todoitems/{id}",
            get(handlers::todos::get_todo)
                .put(handlers::todos::update_todo)
                .delete(handlers::todos::delete_todo),
        )
        .route_layer(metrics_layer)
        // Prometheus scrape, not itself measured
        .route("/metrics", get(handlers::metrics::prometheus_metrics))
        .with_state(state);

    if api_docs_enabled {
        router.merge(openapi::swagger_ui())
    } else {
        router
    }
}
