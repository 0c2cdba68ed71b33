use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stockpilot_ai::analyst::MAX_QUESTION_CHARS;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/stock-analyst", post(analyse))
        .route("/stock-analyst/daily-summary", get(daily_summary))
}

pub async fn analyse(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::AnalyseRequest>,
) -> axum::response::Response {
    // Request-level validation; the analyst enforces the same bounds
    // defensively.
    if body.question.trim().is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "question is required",
        );
    }
    if body.question.chars().count() > MAX_QUESTION_CHARS {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            format!("question must be at most {MAX_QUESTION_CHARS} characters"),
        );
    }

    match services.analyst.analyse(&body.question).await {
        Ok(answer) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "question": body.question,
                "answer": answer,
            })),
        )
            .into_response(),
        Err(e) => errors::analyst_error_to_response(e),
    }
}

pub async fn daily_summary(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.analyst.daily_summary().await {
        Ok(summary) => (
            StatusCode::OK,
            Json(serde_json::json!({ "summary": summary })),
        )
            .into_response(),
        Err(e) => errors::analyst_error_to_response(e),
    }
}
