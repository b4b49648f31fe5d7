use std::sync::Arc;

use defia_growth::api::router::create_router;
use defia_growth::config::AppConfig;
use defia_growth::services::{run_growth_refresher, GrowthReportService};
use defia_growth::{db, metrics, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("Connecting to database...");
    let db = db::init_pool(&config.database_url).await?;
    tracing::info!("Database connected, migrations applied");

    let metrics_handle = metrics::init_metrics()?;

    if config.has_dune_source() {
        tracing::info!(
            query_id = ?config.dune_query_id,
            limit = config.dune_result_limit,
            "Live on-chain source: Dune"
        );
    } else if config.synthetic_fallback_enabled {
        tracing::warn!("No Dune credentials; growth reports will use synthetic data");
    } else {
        tracing::warn!("No Dune credentials and synthetic fallback disabled; reports will be empty");
    }

    let growth = Arc::new(GrowthReportService::from_config(db.clone(), &config)?);

    // --- Background refresher: periodic growth snapshots ---
    if config.growth_refresh_enabled {
        let refresher = growth.clone();
        let interval_secs = config.growth_refresh_interval_secs;
        tokio::spawn(async move {
            run_growth_refresher(refresher, interval_secs).await;
        });
    } else {
        tracing::info!("Growth refresher disabled (GROWTH_REFRESH_ENABLED=false)");
    }

    let state = AppState {
        db,
        config,
        metrics_handle,
        growth,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
