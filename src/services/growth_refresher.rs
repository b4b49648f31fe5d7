use std::sync::Arc;

use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::services::growth_report::GrowthReportService;

/// Run the growth refresher loop. Periodically recomputes the growth report
/// over all stored campaigns and persists it as a snapshot, so dashboards
/// can read history without hitting the data source.
pub async fn run_growth_refresher(service: Arc<GrowthReportService>, interval_secs: u64) {
    let mut ticker = interval(Duration::from_secs(interval_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(interval_secs, "Growth refresher started");

    loop {
        ticker.tick().await;

        if let Err(e) = service.take_snapshot().await {
            tracing::error!(error = %e, "Growth refresher: failed to store snapshot");
        }
    }
}
