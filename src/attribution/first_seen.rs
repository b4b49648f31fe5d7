use std::collections::{BTreeMap, HashMap};

use crate::models::Transaction;

/// Earliest timestamp per wallet. One entry per unique wallet, independent
/// of input order. Ordered by address so downstream float sums are stable.
pub fn wallet_first_seen(transactions: &[Transaction]) -> BTreeMap<String, i64> {
    let mut first_seen: BTreeMap<String, i64> = BTreeMap::new();

    for tx in transactions {
        first_seen
            .entry(tx.wallet_address.clone())
            .and_modify(|ts| *ts = (*ts).min(tx.timestamp_ms))
            .or_insert(tx.timestamp_ms);
    }

    first_seen
}

/// Number of transactions per wallet.
pub fn wallet_tx_counts(transactions: &[Transaction]) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for tx in transactions {
        *counts.entry(tx.wallet_address.as_str()).or_default() += 1;
    }
    counts
}
