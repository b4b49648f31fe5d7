use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    // Pre-register counters so they appear even before the first increment.
    counter!("growth_reports_total").absolute(0);
    counter!("transactions_ingested_total").absolute(0);
    counter!("data_source_fallbacks_total").absolute(0);
    counter!("snapshots_stored_total").absolute(0);

    gauge!("campaigns_tracked").set(0.0);
    gauge!("net_new_wallets").set(0.0);

    // Histogram is lazily created on first record; force creation.
    histogram!("attribution_latency_seconds").record(0.0);

    Ok(handle)
}

/// A handle backed by a recorder that is not installed globally. Renders
/// an empty payload; used where a global recorder cannot be installed
/// twice, e.g. tests building several routers in one process.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}
