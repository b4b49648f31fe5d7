pub mod config;
pub mod engine;
pub mod first_seen;
pub mod window;

pub use config::AttributionConfig;
pub use engine::{attribute, compute_growth_metrics, round2, AttributionLedger};
pub use first_seen::{wallet_first_seen, wallet_tx_counts};
pub use window::{active_campaigns, duration_days, ActiveWindows, DAY_MS};
