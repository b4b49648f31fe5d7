use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::api::ApiResponse;
use crate::attribution::compute_growth_metrics;
use crate::db::snapshot_repo;
use crate::errors::AppError;
use crate::models::{CampaignWindow, ComputedMetrics, GrowthReport, GrowthSnapshot, Transaction};
use crate::AppState;

const DEFAULT_SNAPSHOT_LIMIT: i64 = 30;
const MAX_SNAPSHOT_LIMIT: i64 = 365;

#[derive(Debug, Deserialize)]
pub struct ComputeRequest {
    #[serde(default)]
    pub campaigns: Vec<CampaignWindow>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotQuery {
    pub limit: Option<i64>,
}

/// Stateless engine run over caller-supplied data.
pub async fn compute(
    State(state): State<AppState>,
    Json(body): Json<ComputeRequest>,
) -> Result<Json<ApiResponse<ComputedMetrics>>, AppError> {
    if let Some(c) = body.campaigns.iter().find(|c| c.budget_usd < 0.0) {
        return Err(AppError::BadRequest(format!(
            "campaign {} has an invalid budget",
            c.id
        )));
    }

    let metrics = compute_growth_metrics(&body.campaigns, &body.transactions, &state.config.attribution);
    tracing::debug!(
        campaigns = body.campaigns.len(),
        transactions = body.transactions.len(),
        "Computed growth metrics for supplied data"
    );

    Ok(Json(ApiResponse::ok(metrics)))
}

/// Live report over stored campaigns.
pub async fn report(State(state): State<AppState>) -> Result<Json<ApiResponse<GrowthReport>>, AppError> {
    let report = state.growth.build_report().await?;
    Ok(Json(ApiResponse::ok(report)))
}

pub async fn snapshots(
    State(state): State<AppState>,
    Query(query): Query<SnapshotQuery>,
) -> Result<Json<ApiResponse<Vec<GrowthSnapshot>>>, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SNAPSHOT_LIMIT)
        .clamp(1, MAX_SNAPSHOT_LIMIT);
    let snapshots = snapshot_repo::recent_snapshots(&state.db, limit).await?;
    Ok(Json(ApiResponse::ok(snapshots)))
}

pub async fn latest_snapshot(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<GrowthSnapshot>>, AppError> {
    match snapshot_repo::latest_snapshot(&state.db).await? {
        Some(snapshot) => Ok(Json(ApiResponse::ok(snapshot))),
        None => Err(AppError::NotFound("no growth snapshots yet".into())),
    }
}

pub async fn take_snapshot(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<GrowthSnapshot>>), AppError> {
    let snapshot = state.growth.take_snapshot().await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(snapshot))))
}
