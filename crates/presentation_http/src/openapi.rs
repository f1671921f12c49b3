//! OpenAPI documentation module
//!
//! Provides the OpenAPI 3 document for the todo API and the Swagger UI
//! that serves it.

// Allow clippy warnings from macro-generated code in utoipa derive
#![allow(clippy::needless_for_each)]

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;

/// Path of the Swagger UI
pub const SWAGGER_UI_PATH: &str = "/swagger";

/// Path of the OpenAPI document
pub const OPENAPI_JSON_PATH: &str = "/api-docs/todoapi/swagger.json";

/// OpenAPI documentation for the todo API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "TodoAPI",
        version = "v1",
        description = "CRUD API over in-memory todo items"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    tags(
        (name = "todoitems", description = "Todo item management"),
        (name = "metrics", description = "Prometheus metrics")
    ),
    paths(
        handlers::todos::list_todos,
        handlers::todos::list_completed_todos,
        handlers::todos::get_todo,
        handlers::todos::create_todo,
        handlers::todos::update_todo,
        handlers::todos::delete_todo,
        handlers::metrics::prometheus_metrics,
    ),
    components(
        schemas(
            handlers::todos::TodoRequest,
            handlers::todos::TodoResponse,
            crate::error::ErrorResponse,
        )
    )
)]
#[derive(Debug)]
pub struct ApiDoc;

/// Swagger UI serving [`ApiDoc`]
///
/// Adds the following routes:
/// - `/swagger` - Swagger UI interactive documentation
/// - `/api-docs/todoapi/swagger.json` - OpenAPI document
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_JSON_PATH, ApiDoc::openapi())
}
