//! Ethplorer-shaped provider (shape B)
//!
//! Wire format: flat per-transfer operations that need hash-correlation to
//! detect swaps, plus a separate native-transfer feed merged alongside.
//!
//! ## Endpoints
//!
//! - `GET {base}/getAddressInfo/{address}?apiKey=...` - ETH + token balances
//! - `GET {base}/getAddressHistory/{address}?apiKey=...&limit=N` - token
//!   transfer operations (one record per leg)
//! - `GET {base}/getAddressTransactions/{address}?apiKey=...&limit=N` -
//!   native ETH transfers
//!
//! The API key travels as a query parameter. Token `price` arrives as either
//! an object or the literal `false` for untradeable tokens; decoding accepts
//! both.

use crate::providers::{FetchError, WalletProvider};
use crate::tracker_core::classifier::classify;
use crate::tracker_core::format::{from_base_units, to_compact_display, to_plain_display};
use crate::tracker_core::spam::{is_spam_token, is_spam_transfer};
use crate::tracker_core::swap::collapse_swaps;
use crate::tracker_core::types::{
    Balance, CanonicalTransaction, Portfolio, RawTransferRecord, TokenDescriptor, TokenPrice,
};
use async_trait::async_trait;
use bigdecimal::{BigDecimal, ToPrimitive};
use serde::{Deserialize, Deserializer};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.ethplorer.io";

const ETH_LOGO: &str = "https://ethplorer.io/images/eth.png";
const DEFAULT_DECIMALS: u32 = 18;

pub struct EthplorerProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    page_limit: u32,
}

impl EthplorerProvider {
    pub fn new(base_url: &str, api_key: &str, page_limit: u32) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            page_limit,
        })
    }

    async fn fetch_token_operations(
        &self,
        address: &str,
    ) -> Result<Vec<RawTransferRecord>, FetchError> {
        let url = format!("{}/getAddressHistory/{}", self.base_url, address);
        let limit = self.page_limit.to_string();
        let response: AddressHistoryRaw = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let records = response
            .operations
            .into_iter()
            .map(RawTransferRecord::from)
            .filter(|record| !is_spam_transfer(record))
            .collect();

        Ok(records)
    }

    async fn fetch_native_transactions(
        &self,
        address: &str,
    ) -> Result<Vec<CanonicalTransaction>, FetchError> {
        let url = format!("{}/getAddressTransactions/{}", self.base_url, address);
        let limit = self.page_limit.to_string();
        let response: Vec<EthTransactionRaw> = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .into_iter()
            .filter_map(|raw| raw.into_transaction(address))
            .collect())
    }
}

#[async_trait]
impl WalletProvider for EthplorerProvider {
    async fn fetch_balances(&self, address: &str) -> Result<Portfolio, FetchError> {
        let url = format!("{}/getAddressInfo/{}", self.base_url, address);
        let info: AddressInfoRaw = self
            .client
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut balances = Vec::with_capacity(info.tokens.len() + 1);
        if let Some(eth) = info.eth {
            balances.push(eth.into_balance());
        }
        balances.extend(info.tokens.into_iter().filter_map(TokenBalanceRaw::into_balance));

        Ok(Portfolio { balances })
    }

    async fn fetch_history(
        &self,
        address: &str,
    ) -> Result<Vec<CanonicalTransaction>, FetchError> {
        // Both feeds fetched concurrently; the first failure short-circuits
        // and drops the sibling request.
        let (operations, native) = tokio::try_join!(
            self.fetch_token_operations(address),
            self.fetch_native_transactions(address),
        )?;

        let mut transactions = collapse_swaps(&operations, address);
        transactions.extend(native);
        Ok(transactions)
    }
}

// ---- wire models ----

#[derive(Debug, Deserialize)]
struct AddressInfoRaw {
    #[serde(rename = "ETH")]
    eth: Option<EthBalanceRaw>,
    #[serde(default)]
    tokens: Vec<TokenBalanceRaw>,
}

#[derive(Debug, Deserialize)]
struct EthBalanceRaw {
    balance: f64,
    #[serde(rename = "rawBalance")]
    raw_balance: Option<String>,
    #[serde(default, deserialize_with = "price_or_false")]
    price: Option<PriceRaw>,
}

impl EthBalanceRaw {
    fn into_balance(self) -> Balance {
        let rate = self.price.as_ref().map(|p| p.rate);
        let usd_value = rate.map(|r| self.balance * r);
        Balance {
            address: String::new(),
            symbol: "ETH".to_string(),
            name: "Ethereum".to_string(),
            logo: Some(ETH_LOGO.to_string()),
            raw_balance: self.raw_balance.unwrap_or_else(|| self.balance.to_string()),
            balance: self.balance.to_string(),
            usd_price: rate,
            usd_value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenBalanceRaw {
    #[serde(rename = "tokenInfo")]
    token_info: Option<TokenInfoRaw>,
    #[serde(rename = "rawBalance")]
    raw_balance: String,
}

impl TokenBalanceRaw {
    /// One portfolio row per non-spam token. Skips follow the upstream
    /// contract: spam keywords, missing price, zero supply, malformed
    /// balance.
    fn into_balance(self) -> Option<Balance> {
        let descriptor = TokenDescriptor::from(self.token_info?);
        if is_spam_token(&descriptor) {
            return None;
        }
        let rate = descriptor.price.as_ref()?.rate;
        if descriptor.total_supply == "0" {
            return None;
        }

        let decimals: u32 = descriptor.decimals.parse().unwrap_or(DEFAULT_DECIMALS);
        let value = match from_base_units(&self.raw_balance, decimals) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("skipping balance row for {}: {}", descriptor.address, e);
                return None;
            }
        };

        let usd_value = value.to_f64().map(|v| v * rate).filter(|v| v.is_finite());

        Some(Balance {
            address: descriptor.address,
            symbol: descriptor.symbol.unwrap_or_default(),
            name: descriptor.name.unwrap_or_default(),
            logo: descriptor.image,
            raw_balance: self.raw_balance,
            balance: to_plain_display(&value),
            usd_price: Some(rate),
            usd_value: Some(usd_value.unwrap_or(0.0)),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenInfoRaw {
    address: String,
    symbol: Option<String>,
    name: Option<String>,
    #[serde(default = "default_decimals", deserialize_with = "string_or_number")]
    decimals: String,
    image: Option<String>,
    #[serde(
        rename = "totalSupply",
        default,
        deserialize_with = "string_or_number"
    )]
    total_supply: String,
    #[serde(default, deserialize_with = "price_or_false")]
    price: Option<PriceRaw>,
    #[serde(rename = "holdersCount")]
    holders_count: Option<i64>,
    #[serde(rename = "issuancesCount")]
    issuances_count: Option<i64>,
}

fn default_decimals() -> String {
    DEFAULT_DECIMALS.to_string()
}

impl From<TokenInfoRaw> for TokenDescriptor {
    fn from(raw: TokenInfoRaw) -> Self {
        TokenDescriptor {
            address: raw.address,
            symbol: raw.symbol,
            name: raw.name,
            decimals: raw.decimals,
            image: raw.image.map(|path| {
                if path.starts_with("http") {
                    path
                } else {
                    format!("https://ethplorer.io{}", path)
                }
            }),
            total_supply: raw.total_supply,
            price: raw.price.map(|p| TokenPrice {
                rate: p.rate,
                market_cap_usd: p.market_cap_usd,
                ts: p.ts,
            }),
            holders_count: raw.holders_count,
            issuances_count: raw.issuances_count,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct PriceRaw {
    rate: f64,
    #[serde(rename = "marketCapUsd")]
    market_cap_usd: Option<f64>,
    ts: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct AddressHistoryRaw {
    #[serde(default)]
    operations: Vec<OperationRaw>,
}

#[derive(Debug, Deserialize)]
struct OperationRaw {
    timestamp: i64,
    #[serde(rename = "transactionHash")]
    transaction_hash: String,
    #[serde(rename = "tokenInfo")]
    token_info: Option<TokenInfoRaw>,
    #[serde(rename = "type")]
    op_type: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    value: String,
    from: Option<String>,
    to: Option<String>,
    priority: Option<i64>,
}

impl From<OperationRaw> for RawTransferRecord {
    fn from(op: OperationRaw) -> Self {
        RawTransferRecord {
            hash: op.transaction_hash,
            timestamp: op.timestamp,
            token: op.token_info.map(TokenDescriptor::from),
            value: op.value,
            category: op.op_type,
            from: op.from,
            to: op.to,
            priority: op.priority,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EthTransactionRaw {
    timestamp: i64,
    hash: String,
    from: Option<String>,
    to: Option<String>,
    value: f64,
    #[serde(default)]
    success: Option<bool>,
}

impl EthTransactionRaw {
    fn into_transaction(self, observed_wallet: &str) -> Option<CanonicalTransaction> {
        if self.success == Some(false) {
            return None;
        }

        let amount = match BigDecimal::from_str(&self.value.to_string()) {
            Ok(value) => to_compact_display(&value),
            Err(_) => {
                log::warn!("skipping native transfer {}: bad value", self.hash);
                return None;
            }
        };

        Some(CanonicalTransaction {
            hash: self.hash,
            kind: classify(
                None,
                self.from.as_deref(),
                self.to.as_deref(),
                observed_wallet,
            ),
            from: self.from.unwrap_or_default(),
            to: self.to.unwrap_or_default(),
            amount,
            token_symbol: Some("ETH".to_string()),
            token_name: None,
            token_logo: Some(ETH_LOGO.to_string()),
            usd_value: None,
            fee: None,
            summary: None,
            timestamp: self.timestamp,
        })
    }
}

/// Token `price` is an object for tradeable tokens and the literal `false`
/// otherwise.
fn price_or_false<'de, D>(deserializer: D) -> Result<Option<PriceRaw>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Bool(_) | serde_json::Value::Null => Ok(None),
        other => serde_json::from_value(other)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Numeric fields the upstream serves as either JSON string or number.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_info_with_price_false() {
        let payload = r#"{
            "address": "0x112532b200980ddee8226023bebbe2e6884c31e2",
            "ETH": {"balance": 1.5, "rawBalance": "1500000000000000000",
                    "price": {"rate": 2000.0, "ts": 1700000000}},
            "tokens": [
                {"tokenInfo": {"address": "0xaaa", "symbol": "GOOD", "name": "Good Token",
                               "decimals": "18", "totalSupply": "1000000",
                               "price": {"rate": 1.0, "ts": 1700000000}},
                 "rawBalance": "2000000000000000000"},
                {"tokenInfo": {"address": "0xbbb", "symbol": "DEAD", "name": "Dead Token",
                               "decimals": "18", "totalSupply": "1000000",
                               "price": false},
                 "rawBalance": "1000000000000000000"}
            ]
        }"#;

        let info: AddressInfoRaw = serde_json::from_str(payload).unwrap();
        let eth = info.eth.unwrap().into_balance();
        assert_eq!(eth.symbol, "ETH");
        assert_eq!(eth.usd_value, Some(3000.0));

        let rows: Vec<Balance> = info
            .tokens
            .into_iter()
            .filter_map(TokenBalanceRaw::into_balance)
            .collect();
        // priceless token dropped
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol, "GOOD");
        assert_eq!(rows[0].balance, "2");
        assert_eq!(rows[0].usd_value, Some(2.0));
    }

    #[test]
    fn test_parse_history_operation_with_numeric_fields() {
        let payload = r#"{
            "operations": [
                {"timestamp": 1700000000,
                 "transactionHash": "0xabc",
                 "tokenInfo": {"address": "0xaaa", "symbol": "TKN", "name": "Token",
                               "decimals": 18, "totalSupply": 1000000,
                               "price": {"rate": 0.5}},
                 "type": "transfer",
                 "value": 1000000000000000000,
                 "from": "0xfrom", "to": "0xto"}
            ]
        }"#;

        let history: AddressHistoryRaw = serde_json::from_str(payload).unwrap();
        let record = RawTransferRecord::from(
            history.operations.into_iter().next().unwrap(),
        );
        assert_eq!(record.hash, "0xabc");
        assert_eq!(record.value, "1000000000000000000");
        let token = record.token.unwrap();
        assert_eq!(token.decimals, "18");
    }

    #[test]
    fn test_spam_token_dropped_from_balances() {
        let payload = r#"{"tokenInfo": {"address": "0xccc", "symbol": "FREE",
            "name": "Visit free-tokens.com to claim", "decimals": "18",
            "totalSupply": "1000000", "price": {"rate": 1.0}},
            "rawBalance": "1000000000000000000"}"#;

        let raw: TokenBalanceRaw = serde_json::from_str(payload).unwrap();
        assert!(raw.into_balance().is_none());
    }

    #[tokio::test]
    #[ignore] // Run only when testing against the live API
    async fn test_fetch_balances_live() {
        let provider = EthplorerProvider::new(DEFAULT_BASE_URL, "freekey", 1000).unwrap();
        let portfolio = provider
            .fetch_balances("0x112532B200980Ddee8226023bEbBE2E6884C31e2")
            .await
            .unwrap();
        assert!(!portfolio.balances.is_empty());
    }
}
