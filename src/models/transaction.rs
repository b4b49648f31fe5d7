use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of on-chain event a transaction represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Swap,
    Transfer,
    Mint,
    Stake,
    Bridge,
    #[serde(other)]
    Other,
}

impl TransactionKind {
    /// Lenient mapping from indexer labels. Unknown labels become `Other`.
    pub fn from_api_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "swap" | "trade" | "dex_trade" => TransactionKind::Swap,
            "transfer" | "send" => TransactionKind::Transfer,
            "mint" => TransactionKind::Mint,
            "stake" | "deposit" => TransactionKind::Stake,
            "bridge" => TransactionKind::Bridge,
            _ => TransactionKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Swap => "swap",
            TransactionKind::Transfer => "transfer",
            TransactionKind::Mint => "mint",
            TransactionKind::Stake => "stake",
            TransactionKind::Bridge => "bridge",
            TransactionKind::Other => "other",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single on-chain event, already priced in USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    pub wallet_address: String,
    pub timestamp_ms: i64,
    pub amount_usd: f64,
    pub kind: TransactionKind,
}
