use std::env;
use std::str::FromStr;

use crate::attribution::AttributionConfig;
use crate::ingestion::SyntheticConfig;

const DEFAULT_DUNE_API_URL: &str = "https://api.dune.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Bearer token for the protected API. Empty disables auth (dev mode).
    pub api_token: String,

    // Live on-chain source (optional; synthetic fallback when absent)
    pub dune_api_key: Option<String>,
    pub dune_query_id: Option<u64>,
    pub dune_api_url: String,
    pub dune_result_limit: usize,

    // Fallback
    pub synthetic_fallback_enabled: bool,
    pub synthetic: SyntheticConfig,

    // Background refresh
    pub growth_refresh_enabled: bool,
    pub growth_refresh_interval_secs: u64,

    pub attribution: AttributionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Malformed values fall back to
    /// their defaults; only `DATABASE_URL` is mandatory.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let parse_or = |key: &str, default: f64| -> f64 {
            get(key)
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(default)
        };

        let attribution_defaults = AttributionConfig::default();
        let attribution = AttributionConfig {
            whale_threshold_usd: parse_or("WHALE_THRESHOLD_USD", attribution_defaults.whale_threshold_usd),
            organic_baseline_floor: parse_or(
                "ORGANIC_BASELINE_FLOOR",
                attribution_defaults.organic_baseline_floor,
            ),
            active_wallet_ratio: parse_or("ACTIVE_WALLET_RATIO", attribution_defaults.active_wallet_ratio),
            tvl_change_ratio: parse_or("TVL_CHANGE_RATIO", attribution_defaults.tvl_change_ratio),
        };

        let synthetic_defaults = SyntheticConfig::default();
        let synthetic = SyntheticConfig {
            seed: parsed(get("SYNTHETIC_SEED"), synthetic_defaults.seed),
            wallet_count: parsed(get("SYNTHETIC_WALLET_COUNT"), synthetic_defaults.wallet_count),
            lookback_days: parsed(get("SYNTHETIC_LOOKBACK_DAYS"), synthetic_defaults.lookback_days),
            whale_threshold_usd: attribution.whale_threshold_usd,
            ..synthetic_defaults
        };

        Ok(Self {
            database_url: get("DATABASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parsed(get("PORT"), 8080),
            api_token: get("API_TOKEN").unwrap_or_default(),

            dune_api_key: get("DUNE_API_KEY"),
            dune_query_id: get("DUNE_QUERY_ID").and_then(|v| v.parse().ok()),
            dune_api_url: get("DUNE_API_URL").unwrap_or_else(|| DEFAULT_DUNE_API_URL.into()),
            dune_result_limit: parsed(get("DUNE_RESULT_LIMIT"), 5_000),

            synthetic_fallback_enabled: parsed(get("SYNTHETIC_FALLBACK_ENABLED"), true),
            synthetic,

            growth_refresh_enabled: parsed(get("GROWTH_REFRESH_ENABLED"), false),
            growth_refresh_interval_secs: parsed(get("GROWTH_REFRESH_INTERVAL_SECS"), 3_600),

            attribution,
        })
    }

    /// Returns true if both the Dune API key and query ID are configured.
    pub fn has_dune_source(&self) -> bool {
        self.dune_api_key.is_some() && self.dune_query_id.is_some()
    }
}

fn parsed<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}
