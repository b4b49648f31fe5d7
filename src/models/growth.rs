use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Running per-campaign accumulator. Fractional because credit is split
/// across concurrently active campaigns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignStats {
    pub attributed_users: f64,
    pub volume_usd: f64,
    pub whale_count: f64,
}

/// Marketing effectiveness of one campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignPerformance {
    pub campaign_id: String,
    pub lift: f64,
    pub cpa: f64,
    pub whales_acquired: u64,
    pub roi: f64,
}

/// Brand-wide on-chain health plus per-campaign performance, in input
/// campaign order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputedMetrics {
    pub total_volume_usd: f64,
    pub net_new_wallets: u64,
    /// Heuristic: a fixed share of net-new wallets, not a measured value.
    pub active_wallets: u64,
    pub retention_rate_pct: f64,
    /// Heuristic: a fixed share of total volume, not a TVL delta.
    pub tvl_change_usd: f64,
    pub campaign_performance: Vec<CampaignPerformance>,
    pub organic_new_wallets: u64,
    /// Set when no organic wallets were observed and the baseline was
    /// floored; lift values are then lower bounds rather than multipliers.
    pub lift_is_lower_bound: bool,
}

/// Database row for the growth_snapshots table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GrowthSnapshot {
    pub id: Uuid,
    pub source: String,
    pub transaction_count: i32,
    pub metrics: Json<ComputedMetrics>,
    pub computed_at: Option<DateTime<Utc>>,
}
