use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockpilot_ai::{AnalystError, CompletionError};
use stockpilot_shopify::CatalogError;
use stockpilot_store::StoreError;
use stockpilot_sync::SyncError;

pub fn sync_error_to_response(err: SyncError) -> axum::response::Response {
    match err {
        SyncError::Remote(CatalogError::Config(msg)) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "configuration_error", msg)
        }
        SyncError::Remote(e) => {
            json_error(StatusCode::BAD_GATEWAY, "remote_fetch_error", e.to_string())
        }
        SyncError::Validation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg)
        }
        SyncError::Store(e) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            e.to_string(),
        ),
    }
}

pub fn analyst_error_to_response(err: AnalystError) -> axum::response::Response {
    match err {
        AnalystError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        AnalystError::Completion(CompletionError::Config(msg)) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "configuration_error", msg)
        }
        AnalystError::Completion(e) => {
            json_error(StatusCode::BAD_GATEWAY, "completion_error", e.to_string())
        }
        AnalystError::Store(e) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            e.to_string(),
        ),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "store_error",
        err.to_string(),
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_errors_map_to_expected_status_codes() {
        let resp = sync_error_to_response(SyncError::Validation("bad record".to_string()));
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let resp =
            sync_error_to_response(SyncError::Remote(CatalogError::Network("down".to_string())));
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let resp =
            sync_error_to_response(SyncError::Remote(CatalogError::Config("no token".to_string())));
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let resp = sync_error_to_response(SyncError::Store(StoreError::Database("x".to_string())));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn analyst_errors_map_to_expected_status_codes() {
        let resp = analyst_error_to_response(AnalystError::Validation("empty".to_string()));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = analyst_error_to_response(AnalystError::Completion(CompletionError::Api(
            500,
            "x".to_string(),
        )));
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let resp = analyst_error_to_response(AnalystError::Completion(CompletionError::Config(
            "no key".to_string(),
        )));
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
