use std::time::{Duration, Instant};

use chrono::Utc;
use metrics::{counter, gauge, histogram};
use sqlx::PgPool;

use crate::attribution::{compute_growth_metrics, AttributionConfig};
use crate::config::AppConfig;
use crate::db::{campaign_repo, snapshot_repo};
use crate::ingestion::{generate_transactions, DuneClient, SyntheticConfig};
use crate::models::{Campaign, CampaignWindow, DataSource, GrowthReport, GrowthSnapshot, Transaction};

const DUNE_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// A configured live query.
#[derive(Debug, Clone)]
pub struct LiveSource {
    pub client: DuneClient,
    pub query_id: u64,
    pub limit: usize,
}

/// Decides where a report's transactions come from. The live source is
/// tried first; on failure or absence the synthetic generator stands in,
/// or an empty list when fallback is disabled.
#[derive(Debug, Clone)]
pub struct TransactionResolver {
    pub live: Option<LiveSource>,
    pub synthetic_fallback: bool,
    pub synthetic: SyntheticConfig,
}

impl TransactionResolver {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let live = match (&config.dune_api_key, config.dune_query_id) {
            (Some(key), Some(query_id)) => {
                let http = reqwest::Client::builder().timeout(DUNE_HTTP_TIMEOUT).build()?;
                Some(LiveSource {
                    client: DuneClient::new(http, key.clone()).with_base_url(&config.dune_api_url),
                    query_id,
                    limit: config.dune_result_limit,
                })
            }
            _ => None,
        };

        Ok(Self {
            live,
            synthetic_fallback: config.synthetic_fallback_enabled,
            synthetic: config.synthetic.clone(),
        })
    }

    /// Resolve transactions for the given campaigns. Never fails; upstream
    /// errors are logged and counted.
    pub async fn resolve(&self, campaigns: &[CampaignWindow]) -> (Vec<Transaction>, DataSource) {
        if let Some(live) = &self.live {
            match live.client.fetch_transactions(live.query_id, live.limit).await {
                Ok(transactions) => {
                    counter!("transactions_ingested_total").increment(transactions.len() as u64);
                    tracing::info!(
                        query_id = live.query_id,
                        count = transactions.len(),
                        "Fetched transactions from Dune"
                    );
                    return (transactions, DataSource::Dune);
                }
                Err(e) => {
                    counter!("data_source_fallbacks_total").increment(1);
                    tracing::warn!(
                        error = %e,
                        query_id = live.query_id,
                        synthetic_fallback = self.synthetic_fallback,
                        "Dune fetch failed, falling back"
                    );
                }
            }
        }

        if self.synthetic_fallback {
            let transactions = generate_transactions(&self.synthetic, campaigns, Utc::now());
            tracing::debug!(count = transactions.len(), "Generated synthetic transactions");
            (transactions, DataSource::Synthetic)
        } else {
            (Vec::new(), DataSource::Empty)
        }
    }
}

/// Run the engine and record timing and headline metrics.
pub fn run_attribution(
    campaigns: &[CampaignWindow],
    transactions: &[Transaction],
    source: DataSource,
    config: &AttributionConfig,
) -> GrowthReport {
    let start = Instant::now();
    let metrics = compute_growth_metrics(campaigns, transactions, config);
    let elapsed = start.elapsed();

    counter!("growth_reports_total").increment(1);
    histogram!("attribution_latency_seconds").record(elapsed.as_secs_f64());
    gauge!("net_new_wallets").set(metrics.net_new_wallets as f64);

    tracing::info!(
        source = %source,
        campaigns = campaigns.len(),
        transactions = transactions.len(),
        net_new_wallets = metrics.net_new_wallets,
        organic_new_wallets = metrics.organic_new_wallets,
        elapsed_ms = elapsed.as_millis() as u64,
        "Growth metrics computed"
    );

    GrowthReport {
        source,
        transaction_count: transactions.len(),
        metrics,
    }
}

/// Builds reports from stored campaigns and resolved transactions.
pub struct GrowthReportService {
    pool: PgPool,
    resolver: TransactionResolver,
    attribution: AttributionConfig,
}

impl GrowthReportService {
    pub fn new(pool: PgPool, resolver: TransactionResolver, attribution: AttributionConfig) -> Self {
        Self {
            pool,
            resolver,
            attribution,
        }
    }

    pub fn from_config(pool: PgPool, config: &AppConfig) -> anyhow::Result<Self> {
        let resolver = TransactionResolver::from_config(config)?;
        Ok(Self::new(pool, resolver, config.attribution))
    }

    pub fn attribution_config(&self) -> &AttributionConfig {
        &self.attribution
    }

    /// Compute a report over every stored campaign.
    pub async fn build_report(&self) -> anyhow::Result<GrowthReport> {
        let campaigns = campaign_repo::list_campaigns(&self.pool).await?;
        let windows: Vec<CampaignWindow> = campaigns.iter().map(Campaign::to_window).collect();
        gauge!("campaigns_tracked").set(windows.len() as f64);

        let (transactions, source) = self.resolver.resolve(&windows).await;

        Ok(run_attribution(&windows, &transactions, source, &self.attribution))
    }

    /// Compute a report and persist it as a snapshot.
    pub async fn take_snapshot(&self) -> anyhow::Result<GrowthSnapshot> {
        let report = self.build_report().await?;
        let snapshot = snapshot_repo::insert_snapshot(&self.pool, &report).await?;
        counter!("snapshots_stored_total").increment(1);

        tracing::info!(
            snapshot_id = %snapshot.id,
            source = %report.source,
            "Growth snapshot stored"
        );

        Ok(snapshot)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
