use axum::Router;

pub mod analyst;
pub mod sync;
pub mod system;

/// Router for all API endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/api/shopify", sync::router())
        .nest("/api/ai", analyst::router())
}
