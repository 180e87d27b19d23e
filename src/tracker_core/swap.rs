//! Swap correlation over flat per-transfer records
//!
//! Providers whose wire format emits one record per transfer leg need
//! cross-record correlation: the legs of a swap share a transaction hash.
//! Hash groups holding both an outgoing and an incoming leg for the observed
//! wallet collapse into one synthetic SWAP transaction; the whole group is
//! consumed, unmatched legs included. Groups that fail the swap condition
//! fall through to individual classification in original order.

use crate::tracker_core::classifier::{classify, TransactionKind};
use crate::tracker_core::format::{from_base_units, to_compact_display};
use crate::tracker_core::types::{CanonicalTransaction, RawTransferRecord, TokenDescriptor};
use bigdecimal::ToPrimitive;
use std::collections::{HashMap, HashSet};

const DEFAULT_DECIMALS: u32 = 18;

/// Collapse multi-leg hash groups into SWAP transactions and classify the
/// rest individually.
///
/// Output ordering: swap-collapsed transactions first (hash first-occurrence
/// order), then non-swap records in original relative order. Sorting by
/// timestamp is the aggregator's responsibility.
pub fn collapse_swaps(
    records: &[RawTransferRecord],
    observed_wallet: &str,
) -> Vec<CanonicalTransaction> {
    let mut groups: HashMap<&str, Vec<&RawTransferRecord>> = HashMap::new();
    let mut hash_order: Vec<&str> = Vec::new();

    for record in records {
        let group = groups.entry(record.hash.as_str()).or_default();
        if group.is_empty() {
            hash_order.push(record.hash.as_str());
        }
        group.push(record);
    }

    let mut transactions = Vec::with_capacity(records.len());
    let mut consumed: HashSet<&str> = HashSet::new();

    for hash in &hash_order {
        let group = &groups[hash];
        if group.len() < 2 {
            continue;
        }

        let sent_leg = group
            .iter()
            .find(|r| matches_wallet(r.from.as_deref(), observed_wallet));
        let received_leg = group
            .iter()
            .find(|r| matches_wallet(r.to.as_deref(), observed_wallet));

        if let (Some(sent), Some(received)) = (sent_leg, received_leg) {
            if let (Some(sent_token), Some(received_token)) = (&sent.token, &received.token) {
                if let Some(swap) = build_swap(sent, received, sent_token, received_token) {
                    transactions.push(swap);
                    consumed.insert(*hash);
                }
            }
        }
    }

    for record in records {
        if consumed.contains(record.hash.as_str()) {
            continue;
        }
        if let Some(tx) = classify_record(record, observed_wallet) {
            transactions.push(tx);
        }
    }

    transactions
}

fn matches_wallet(address: Option<&str>, wallet: &str) -> bool {
    address.is_some_and(|a| a.eq_ignore_ascii_case(wallet))
}

fn build_swap(
    sent: &RawTransferRecord,
    received: &RawTransferRecord,
    sent_token: &TokenDescriptor,
    received_token: &TokenDescriptor,
) -> Option<CanonicalTransaction> {
    let sent_amount = formatted_amount(&sent.value, sent_token)?;
    let received_amount = formatted_amount(&received.value, received_token)?;

    Some(CanonicalTransaction {
        hash: sent.hash.clone(),
        kind: TransactionKind::Swap,
        from: sent.from.clone().unwrap_or_default(),
        to: received.to.clone().unwrap_or_default(),
        amount: format!(
            "{} {} ➝ {} {}",
            sent_amount,
            sent_token.symbol.as_deref().unwrap_or_default(),
            received_amount,
            received_token.symbol.as_deref().unwrap_or_default(),
        ),
        token_symbol: None,
        token_name: None,
        token_logo: None,
        usd_value: None,
        fee: None,
        summary: None,
        timestamp: sent.timestamp,
    })
}

/// Classify one ungrouped record. A malformed amount fails only this record
/// (warn and skip), never the batch.
fn classify_record(
    record: &RawTransferRecord,
    observed_wallet: &str,
) -> Option<CanonicalTransaction> {
    let amount = match &record.token {
        Some(token) => formatted_amount(&record.value, token)?,
        None => match from_base_units(&record.value, DEFAULT_DECIMALS) {
            Ok(value) => to_compact_display(&value),
            Err(e) => {
                log::warn!("skipping record {}: {}", record.hash, e);
                return None;
            }
        },
    };

    let usd_value = record.token.as_ref().and_then(|token| {
        let rate = token.price.as_ref()?.rate;
        let value = from_base_units(&record.value, token_decimals(token)).ok()?;
        Some(rate * value.to_f64()?)
    });

    Some(CanonicalTransaction {
        hash: record.hash.clone(),
        kind: classify(
            record.category.as_deref(),
            record.from.as_deref(),
            record.to.as_deref(),
            observed_wallet,
        ),
        from: record.from.clone().unwrap_or_default(),
        to: record.to.clone().unwrap_or_default(),
        amount,
        token_symbol: record.token.as_ref().and_then(|t| t.symbol.clone()),
        token_name: record.token.as_ref().and_then(|t| t.name.clone()),
        token_logo: record.token.as_ref().and_then(|t| t.image.clone()),
        usd_value,
        fee: None,
        summary: None,
        timestamp: record.timestamp,
    })
}

fn formatted_amount(raw: &str, token: &TokenDescriptor) -> Option<String> {
    match from_base_units(raw, token_decimals(token)) {
        Ok(value) => Some(to_compact_display(&value)),
        Err(e) => {
            log::warn!("skipping malformed amount: {}", e);
            None
        }
    }
}

fn token_decimals(token: &TokenDescriptor) -> u32 {
    token.decimals.parse().unwrap_or(DEFAULT_DECIMALS)
}
