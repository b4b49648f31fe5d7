use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A marketing campaign as seen by the attribution engine.
///
/// The window is the closed interval `[start_date, end_date]`. Windows of
/// different campaigns may overlap; a window with `start_date > end_date`
/// is never active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignWindow {
    pub id: String,
    #[serde(deserialize_with = "deserialize_flexible_datetime")]
    pub start_date: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_flexible_datetime")]
    pub end_date: DateTime<Utc>,
    pub budget_usd: f64,
    #[serde(default)]
    pub channel: String,
}

impl CampaignWindow {
    pub fn start_ms(&self) -> i64 {
        self.start_date.timestamp_millis()
    }

    pub fn end_ms(&self) -> i64 {
        self.end_date.timestamp_millis()
    }

    /// Inclusive on both ends. An inverted window contains nothing.
    pub fn contains(&self, timestamp_ms: i64) -> bool {
        self.start_ms() <= timestamp_ms && timestamp_ms <= self.end_ms()
    }
}

/// Database row for the campaigns table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub channel: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub budget_usd: Decimal,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Campaign {
    pub fn to_window(&self) -> CampaignWindow {
        CampaignWindow {
            id: self.id.to_string(),
            start_date: self.start_date,
            end_date: self.end_date,
            budget_usd: self.budget_usd.to_f64().unwrap_or(0.0),
            channel: self.channel.clone(),
        }
    }
}

/// Request body for creating a campaign.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCampaign {
    pub name: String,
    #[serde(default)]
    pub channel: String,
    #[serde(deserialize_with = "deserialize_flexible_datetime")]
    pub start_date: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_flexible_datetime")]
    pub end_date: DateTime<Utc>,
    pub budget_usd: Decimal,
}

/// Parse a campaign boundary. Accepts RFC 3339 or a bare `YYYY-MM-DD`,
/// which is taken as midnight UTC.
pub fn parse_flexible_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_flexible_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flexible_datetime(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
}
