pub mod search;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::AppState;

/// OpenAPI 文档定义
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Host Finder API",
        version = "0.1.0",
        description = "Institution search proxy in front of the Canvas accounts search API",
        license(name = "GPL-3.0", url = "https://www.gnu.org/licenses/gpl-3.0.html")
    ),
    servers(
        (url = "/", description = "Current server")
    ),
    paths(
        search::search,
        health,
    ),
    components(schemas(
        crate::finder::HostRecord,
        search::ErrorResponse,
    )),
    tags(
        (name = "Search", description = "Upstream search pass-through"),
        (name = "Health", description = "Liveness probe")
    )
)]
pub struct ApiDoc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/search", get(search::search))
}

/// 创建包含 Swagger UI 的完整路由
pub fn routes_with_docs() -> Router<Arc<AppState>> {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", routes())
}

/// 完整应用：路由 + CORS + 状态
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([axum::http::header::LINK]);

    routes_with_docs().layer(cors).with_state(state)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    ),
    tag = "Health"
)]
async fn health() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_proxy_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/search"));
        assert!(doc.paths.paths.contains_key("/api/health"));
    }
}
