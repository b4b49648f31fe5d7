use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::api::ApiResponse;
use crate::db::campaign_repo;
use crate::errors::AppError;
use crate::models::{Campaign, NewCampaign};
use crate::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Campaign>>>, AppError> {
    let campaigns = campaign_repo::list_campaigns(&state.db).await?;
    Ok(Json(ApiResponse::ok(campaigns)))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewCampaign>,
) -> Result<(StatusCode, Json<ApiResponse<Campaign>>), AppError> {
    validate_new_campaign(&body)?;

    // An inverted window is stored as-is; it never attributes anything.
    if body.end_date < body.start_date {
        tracing::warn!(
            name = %body.name,
            start = %body.start_date,
            end = %body.end_date,
            "Campaign window ends before it starts"
        );
    }

    let campaign = campaign_repo::insert_campaign(&state.db, &body).await?;
    tracing::info!(id = %campaign.id, name = %campaign.name, "Campaign created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(campaign))))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Campaign>>, AppError> {
    match campaign_repo::get_campaign(&state.db, id).await? {
        Some(campaign) => Ok(Json(ApiResponse::ok(campaign))),
        None => Err(AppError::NotFound(format!("campaign {id}"))),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if campaign_repo::delete_campaign(&state.db, id).await? {
        tracing::info!(id = %id, "Campaign deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("campaign {id}")))
    }
}

fn validate_new_campaign(body: &NewCampaign) -> Result<(), AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    if body.budget_usd < Decimal::ZERO {
        return Err(AppError::BadRequest("budget_usd must be >= 0".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::campaign::parse_flexible_datetime;

    fn new_campaign(name: &str, budget: i64) -> NewCampaign {
        NewCampaign {
            name: name.into(),
            channel: "twitter".into(),
            start_date: parse_flexible_datetime("2024-01-01").unwrap(),
            end_date: parse_flexible_datetime("2024-01-10").unwrap(),
            budget_usd: Decimal::from(budget),
        }
    }

    #[test]
    fn test_validation() {
        assert!(validate_new_campaign(&new_campaign("Launch", 1000)).is_ok());
        assert!(validate_new_campaign(&new_campaign("Free", 0)).is_ok());
        assert!(matches!(
            validate_new_campaign(&new_campaign("  ", 1000)),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            validate_new_campaign(&new_campaign("Refund", -1)),
            Err(AppError::BadRequest(_))
        ));
    }
}
