use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::api::ApiResponse;
use crate::attribution::AttributionConfig;
use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();
    let data_source = if state.config.has_dune_source() {
        "dune"
    } else if state.config.synthetic_fallback_enabled {
        "synthetic"
    } else {
        "empty"
    };

    if db_ok {
        (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "data_source": data_source })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unhealthy", "db": "disconnected", "data_source": data_source })),
        )
    }
}

pub async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state.metrics_handle.render();
    ([(CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

/// Effective attribution constants.
pub async fn attribution_config(State(state): State<AppState>) -> Json<ApiResponse<AttributionConfig>> {
    Json(ApiResponse::ok(*state.growth.attribution_config()))
}
