use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Campaign, NewCampaign};

/// Insert a campaign and return the stored row.
pub async fn insert_campaign(pool: &PgPool, campaign: &NewCampaign) -> anyhow::Result<Campaign> {
    let row = sqlx::query_as::<_, Campaign>(
        r#"
        INSERT INTO campaigns (name, channel, start_date, end_date, budget_usd)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(&campaign.name)
    .bind(&campaign.channel)
    .bind(campaign.start_date)
    .bind(campaign.end_date)
    .bind(campaign.budget_usd)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetch all campaigns, oldest window first.
pub async fn list_campaigns(pool: &PgPool) -> anyhow::Result<Vec<Campaign>> {
    let rows = sqlx::query_as::<_, Campaign>(
        "SELECT * FROM campaigns ORDER BY start_date, created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetch a campaign by ID.
pub async fn get_campaign(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<Campaign>> {
    let row = sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Delete a campaign. Returns false if it did not exist.
pub async fn delete_campaign(pool: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM campaigns WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

