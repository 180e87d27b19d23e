//! Unified domain model shared by every provider shape

use crate::tracker_core::classifier::TransactionKind;
use serde::{Deserialize, Serialize};

/// One observed value movement tied to a transaction hash.
///
/// Providers that return one record per transfer leg parse into this type
/// before swap correlation. Multiple records may share the same hash
/// (multi-leg transactions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransferRecord {
    pub hash: String,
    pub timestamp: i64,
    /// Absent for native-currency movements.
    pub token: Option<TokenDescriptor>,
    /// Raw integer-string amount in base units.
    pub value: String,
    /// Upstream categorical hint ("mint", "burn", "transfer", ...).
    pub category: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub priority: Option<i64>,
}

/// Token metadata carried by a transfer record or balance row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenDescriptor {
    pub address: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    /// Decimal places as returned on the wire (string; parse failures
    /// default to 18 downstream).
    pub decimals: String,
    pub image: Option<String>,
    pub total_supply: String,
    /// Absence signals an untradeable/unverifiable token.
    pub price: Option<TokenPrice>,
    pub holders_count: Option<i64>,
    pub issuances_count: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPrice {
    pub rate: f64,
    pub market_cap_usd: Option<f64>,
    pub ts: Option<i64>,
}

/// The unified output unit of the normalization pipeline.
///
/// For swaps the amount carries the composite "A ➝ B" string and the token
/// fields are None (two tokens are involved).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalTransaction {
    pub hash: String,
    pub kind: TransactionKind,
    pub from: String,
    pub to: String,
    pub amount: String,
    pub token_symbol: Option<String>,
    pub token_name: Option<String>,
    pub token_logo: Option<String>,
    pub usd_value: Option<f64>,
    pub fee: Option<String>,
    pub summary: Option<String>,
    pub timestamp: i64,
}

/// One row of the wallet's portfolio snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    /// Contract address; empty for the native currency row.
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub logo: Option<String>,
    pub raw_balance: String,
    /// Human decimal form, plain notation.
    pub balance: String,
    pub usd_price: Option<f64>,
    pub usd_value: Option<f64>,
}

/// Wallet portfolio: native row (if any) first, then token rows.
///
/// Ephemeral by design: recomputed on every fetch, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Portfolio {
    pub balances: Vec<Balance>,
}

impl Portfolio {
    pub fn total_usd(&self) -> f64 {
        self.balances.iter().filter_map(|b| b.usd_value).sum()
    }
}
