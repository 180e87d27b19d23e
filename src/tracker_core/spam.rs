//! Promotional-token and spam-transfer heuristics
//!
//! Both predicates are pure and total: malformed or missing fields classify
//! as spam (exclude) rather than erroring.

use crate::tracker_core::types::{RawTransferRecord, TokenDescriptor};

const SPAM_KEYWORDS: [&str; 7] = ["http", ".com", "claim", "gift", "visit", "earn", "free"];

/// Keyword heuristic over token name and symbol (case-insensitive
/// substring match).
pub fn is_spam_token(token: &TokenDescriptor) -> bool {
    let name = token.name.as_deref().unwrap_or_default().to_lowercase();
    let symbol = token.symbol.as_deref().unwrap_or_default().to_lowercase();

    SPAM_KEYWORDS
        .iter()
        .any(|keyword| name.contains(keyword) || symbol.contains(keyword))
}

/// Structural red flags on top of the keyword check.
///
/// A record with no token descriptor is excluded outright: providers that
/// require explicit token metadata cannot classify it.
pub fn is_spam_transfer(record: &RawTransferRecord) -> bool {
    match &record.token {
        None => true,
        Some(token) => {
            is_spam_token(token) || token.price.is_none() || token.total_supply == "0"
        }
    }
}
