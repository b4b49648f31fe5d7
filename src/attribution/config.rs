use serde::{Deserialize, Serialize};

/// Tunable constants of the attribution engine.
///
/// None of these have a documented derivation; the defaults reproduce the
/// dashboard's historical numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributionConfig {
    /// A transaction is whale-sized when its amount is strictly above this (default: 5000).
    pub whale_threshold_usd: f64,
    /// Daily organic baseline used when no organic wallet was observed (default: 1).
    pub organic_baseline_floor: f64,
    /// Share of net-new wallets reported as active (default: 0.65).
    pub active_wallet_ratio: f64,
    /// Share of total volume reported as TVL change (default: 0.85).
    pub tvl_change_ratio: f64,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            whale_threshold_usd: 5_000.0,
            organic_baseline_floor: 1.0,
            active_wallet_ratio: 0.65,
            tvl_change_ratio: 0.85,
        }
    }
}
