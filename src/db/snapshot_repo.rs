use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::{GrowthReport, GrowthSnapshot};

/// Persist a computed report as a snapshot.
pub async fn insert_snapshot(pool: &PgPool, report: &GrowthReport) -> anyhow::Result<GrowthSnapshot> {
    let snapshot = sqlx::query_as::<_, GrowthSnapshot>(
        r#"
        INSERT INTO growth_snapshots (source, transaction_count, metrics)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(report.source.as_str())
    .bind(i32::try_from(report.transaction_count).unwrap_or(i32::MAX))
    .bind(Json(&report.metrics))
    .fetch_one(pool)
    .await?;

    Ok(snapshot)
}

/// Most recent snapshot, if any.
pub async fn latest_snapshot(pool: &PgPool) -> anyhow::Result<Option<GrowthSnapshot>> {
    let snapshot = sqlx::query_as::<_, GrowthSnapshot>(
        "SELECT * FROM growth_snapshots ORDER BY computed_at DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(snapshot)
}

/// Most recent snapshots, newest first.
pub async fn recent_snapshots(pool: &PgPool, limit: i64) -> anyhow::Result<Vec<GrowthSnapshot>> {
    let snapshots = sqlx::query_as::<_, GrowthSnapshot>(
        "SELECT * FROM growth_snapshots ORDER BY computed_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(snapshots)
}
