//! Seeded stand-in transaction data.
//!
//! Used when no live on-chain source is configured or the live fetch fails,
//! so dashboards still render plausible numbers. Output is fully determined
//! by the config, the campaign set and the end of the range.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::attribution::{ActiveWindows, DAY_MS};
use crate::models::{CampaignWindow, Transaction, TransactionKind};

const KINDS: [TransactionKind; 5] = [
    TransactionKind::Swap,
    TransactionKind::Transfer,
    TransactionKind::Mint,
    TransactionKind::Stake,
    TransactionKind::Bridge,
];

/// Whale amounts go up to ten times the threshold.
const MAX_WHALE_THRESHOLD_USD: f64 = 1e12;

#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub seed: u64,
    /// Upper bound on distinct wallets generated.
    pub wallet_count: usize,
    pub lookback_days: i64,
    /// Returning-wallet transactions per day.
    pub daily_activity: usize,
    /// Extra new-wallet rate on days with an active campaign (1.5 = +150%).
    pub campaign_boost: f64,
    pub whale_probability: f64,
    pub whale_threshold_usd: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            wallet_count: 250,
            lookback_days: 30,
            daily_activity: 12,
            campaign_boost: 1.5,
            whale_probability: 0.03,
            whale_threshold_usd: 5_000.0,
        }
    }
}

/// Generate `lookback_days` of activity ending at `end`.
pub fn generate_transactions(
    config: &SyntheticConfig,
    campaigns: &[CampaignWindow],
    end: DateTime<Utc>,
) -> Vec<Transaction> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let days = config.lookback_days.max(1);
    let range_start = end.timestamp_millis() - days * DAY_MS;
    let windows = ActiveWindows::new(campaigns);
    let whale_p = config.whale_probability.max(0.0).min(1.0);

    let base_new_per_day = (config.wallet_count as f64 / days as f64 / 2.0).max(1.0);
    let mut wallets: Vec<String> = Vec::with_capacity(config.wallet_count);
    let mut transactions = Vec::new();
    let mut active = Vec::new();

    for day in 0..days {
        let day_start = range_start + day * DAY_MS;
        windows.active_at(day_start + DAY_MS / 2, &mut active);

        let new_today = if active.is_empty() {
            base_new_per_day
        } else {
            base_new_per_day * (1.0 + config.campaign_boost.max(0.0))
        };
        let new_today = (new_today.round() as usize)
            .min(config.wallet_count.saturating_sub(wallets.len()));

        for _ in 0..new_today {
            let wallet = random_hex(&mut rng, 40);
            let tx = random_transaction(&mut rng, config, whale_p, &wallet, day_start);
            wallets.push(wallet);
            transactions.push(tx);
        }

        if wallets.is_empty() {
            continue;
        }

        for _ in 0..config.daily_activity {
            let idx = rng.gen_range(0..wallets.len());
            let tx = random_transaction(&mut rng, config, whale_p, &wallets[idx], day_start);
            transactions.push(tx);
        }
    }

    transactions
}

fn random_transaction(
    rng: &mut StdRng,
    config: &SyntheticConfig,
    whale_p: f64,
    wallet: &str,
    day_start: i64,
) -> Transaction {
    // NaN maps to 0 and huge values are capped so the ranges stay finite
    let threshold = config.whale_threshold_usd.max(0.0).min(MAX_WHALE_THRESHOLD_USD);
    let amount = if rng.gen_bool(whale_p) {
        rng.gen_range(threshold + 0.01..threshold * 10.0 + 1.0)
    } else {
        rng.gen_range(5.0..threshold.clamp(5.01, 2_500.0))
    };

    Transaction {
        hash: random_hex(rng, 64),
        wallet_address: wallet.to_string(),
        timestamp_ms: day_start + rng.gen_range(0..DAY_MS),
        amount_usd: (amount * 100.0).round() / 100.0,
        kind: KINDS[rng.gen_range(0..KINDS.len())],
    }
}

fn random_hex(rng: &mut StdRng, len: usize) -> String {
    let mut out = String::with_capacity(len + 2);
    out.push_str("0x");
    while out.len() < len + 2 {
        out.push_str(&format!("{:016x}", rng.gen::<u64>()));
    }
    out.truncate(len + 2);
    out
}
