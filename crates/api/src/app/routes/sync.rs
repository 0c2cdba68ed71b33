use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/sync/products", post(sync_products))
        .route("/sync/orders", post(sync_orders))
}

pub async fn sync_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.sync.sync_products().await {
        Ok(count) => (
            StatusCode::OK,
            Json(serde_json::json!({ "synced_products": count })),
        )
            .into_response(),
        Err(e) => errors::sync_error_to_response(e),
    }
}

pub async fn sync_orders(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.sync.sync_orders().await {
        Ok(count) => (
            StatusCode::OK,
            Json(serde_json::json!({ "synced_orders": count })),
        )
            .into_response(),
        Err(e) => errors::sync_error_to_response(e),
    }
}

pub async fn dashboard(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.insights.dashboard().await {
        Ok(dashboard) => (
            StatusCode::OK,
            Json(dto::DashboardResponse::new(
                dashboard,
                services.author.clone(),
            )),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
