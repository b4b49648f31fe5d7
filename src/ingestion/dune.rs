use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{Transaction, TransactionKind};

const DUNE_API_BASE: &str = "https://api.dune.com";

/// Epoch values above this are taken as milliseconds, below as seconds.
const EPOCH_MILLIS_CUTOFF: i64 = 100_000_000_000;

#[derive(Debug, Error)]
pub enum DuneClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct QueryResultsResponse {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub result: Option<QueryResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub rows: Vec<DuneRow>,
}

/// One row of a transactions query. Column names vary between queries,
/// so the common spellings are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct DuneRow {
    #[serde(default, alias = "hash")]
    pub tx_hash: Option<String>,
    #[serde(default, alias = "wallet", alias = "from")]
    pub wallet_address: Option<String>,
    #[serde(default, alias = "timestamp")]
    pub block_time: Option<serde_json::Value>,
    #[serde(default, alias = "usd_value")]
    pub amount_usd: Option<serde_json::Value>,
    #[serde(default, alias = "type")]
    pub kind: Option<String>,
}

impl DuneRow {
    /// Map into a `Transaction`. Rows without a wallet or a parseable time
    /// are unusable and yield `None`.
    pub fn into_transaction(self, index: usize) -> Option<Transaction> {
        let wallet = self
            .wallet_address
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())?;
        let timestamp_ms = self.block_time.as_ref().and_then(parse_timestamp_ms)?;

        let amount_usd = self
            .amount_usd
            .as_ref()
            .and_then(parse_amount)
            .unwrap_or(0.0);

        let hash = self
            .tx_hash
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| format!("dune-row-{index}"));

        let kind = self
            .kind
            .as_deref()
            .map(TransactionKind::from_api_str)
            .unwrap_or(TransactionKind::Other);

        Some(Transaction {
            hash,
            wallet_address: wallet,
            timestamp_ms,
            amount_usd,
            kind,
        })
    }
}

/// Map query rows into transactions. Returns the transactions and the number
/// of rows dropped.
pub fn map_rows(rows: Vec<DuneRow>) -> (Vec<Transaction>, usize) {
    let total = rows.len();
    let transactions: Vec<Transaction> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(i, row)| row.into_transaction(i))
        .collect();
    let dropped = total - transactions.len();
    (transactions, dropped)
}

/// Parse Dune's timestamp encodings: RFC 3339, `2024-01-05 12:00:00.000 UTC`,
/// or epoch seconds / milliseconds as a number or string.
pub fn parse_timestamp_ms(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(epoch_to_ms),
        serde_json::Value::String(s) => {
            let s = s.trim();
            if let Ok(epoch) = s.parse::<i64>() {
                return Some(epoch_to_ms(epoch));
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc).timestamp_millis());
            }
            let naive = s.trim_end_matches("UTC").trim();
            NaiveDateTime::parse_from_str(naive, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|dt| dt.and_utc().timestamp_millis())
        }
        _ => None,
    }
}

fn epoch_to_ms(epoch: i64) -> i64 {
    if epoch.abs() >= EPOCH_MILLIS_CUTOFF {
        epoch
    } else {
        epoch * 1000
    }
}

fn parse_amount(value: &serde_json::Value) -> Option<f64> {
    let amount = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    amount.filter(|f| f.is_finite())
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DuneClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl DuneClient {
    pub fn new(http: Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: DUNE_API_BASE.into(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch the latest stored results of a saved query.
    pub async fn get_query_results(
        &self,
        query_id: u64,
        limit: usize,
    ) -> Result<Vec<DuneRow>, DuneClientError> {
        let url = format!("{}/api/v1/query/{}/results", self.base_url, query_id);
        let resp = self
            .http
            .get(&url)
            .header("X-Dune-API-Key", &self.api_key)
            .query(&[("limit", limit.to_string())])
            .send()
            .await?
            .error_for_status()?;

        let body: QueryResultsResponse = resp.json().await?;

        match body.result {
            Some(result) => Ok(result.rows),
            None => Err(DuneClientError::Unexpected(format!(
                "query {query_id} has no result (state: {})",
                body.state.as_deref().unwrap_or("unknown")
            ))),
        }
    }

    /// Fetch a transactions query and map its rows.
    pub async fn fetch_transactions(
        &self,
        query_id: u64,
        limit: usize,
    ) -> Result<Vec<Transaction>, DuneClientError> {
        let rows = self.get_query_results(query_id, limit).await?;
        let (transactions, dropped) = map_rows(rows);

        if dropped > 0 {
            tracing::warn!(
                query_id,
                dropped,
                kept = transactions.len(),
                "Dropped Dune rows without wallet or timestamp"
            );
        }

        Ok(transactions)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
