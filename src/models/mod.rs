pub mod campaign;
pub mod growth;
pub mod transaction;

pub use campaign::{Campaign, CampaignWindow, NewCampaign};
pub use growth::{CampaignPerformance, CampaignStats, ComputedMetrics, GrowthSnapshot};
pub use transaction::{Transaction, TransactionKind};

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// DataSource: where a report's transactions came from
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Live on-chain query results.
    Dune,
    /// Generated stand-in data (no live source, or the live fetch failed).
    Synthetic,
    /// No data available and synthetic fallback disabled.
    Empty,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Dune => "dune",
            DataSource::Synthetic => "synthetic",
            DataSource::Empty => "empty",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GrowthReport: engine output plus provenance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthReport {
    pub source: DataSource,
    pub transaction_count: usize,
    pub metrics: ComputedMetrics,
}
