//! Moralis-shaped provider (shape A)
//!
//! Wire format: pre-aggregated per-transaction records, each nesting its
//! ERC-20 and native transfer legs with an explicit direction. Swap
//! detection is the direct rule — a record carrying both sent and received
//! ERC-20 legs is one swap — so no cross-record correlation is needed.
//!
//! ## Endpoints
//!
//! - `GET {base}/wallets/{address}/tokens?chain=eth&exclude_spam=true`
//! - `GET {base}/wallets/{address}/history?chain=eth&exclude_spam=true`
//!
//! The API key travels as the `X-API-Key` request header.

use crate::providers::{FetchError, WalletProvider};
use crate::tracker_core::classifier::TransactionKind;
use crate::tracker_core::format::{from_base_units, to_compact_display};
use crate::tracker_core::spam::is_spam_token;
use crate::tracker_core::types::{
    Balance, CanonicalTransaction, Portfolio, TokenDescriptor,
};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::DateTime;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://deep-index.moralis.io/api/v2.2";

const ETH_LOGO: &str = "https://cdn.moralis.io/eth/0x.png";
const API_KEY_HEADER: &str = "X-API-Key";

pub struct MoralisProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MoralisProvider {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl WalletProvider for MoralisProvider {
    async fn fetch_balances(&self, address: &str) -> Result<Portfolio, FetchError> {
        let url = format!("{}/wallets/{}/tokens", self.base_url, address);
        let response: TokenBalancesResponse = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("chain", "eth"), ("exclude_spam", "true")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut balances: Vec<Balance> = response
            .result
            .into_iter()
            .filter_map(TokenBalanceRaw::into_balance)
            .collect();
        // Native row first, mirroring the portfolio layout of shape B.
        balances.sort_by_key(|b| !b.address.is_empty());

        Ok(Portfolio { balances })
    }

    async fn fetch_history(
        &self,
        address: &str,
    ) -> Result<Vec<CanonicalTransaction>, FetchError> {
        let url = format!("{}/wallets/{}/history", self.base_url, address);
        let response: TransactionHistoryResponse = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("chain", "eth"), ("exclude_spam", "true")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .result
            .into_iter()
            .flat_map(TransactionRecordRaw::into_transactions)
            .collect())
    }
}

// ---- wire models ----

#[derive(Debug, Deserialize)]
struct TokenBalancesResponse {
    result: Vec<TokenBalanceRaw>,
}

#[derive(Debug, Deserialize)]
struct TokenBalanceRaw {
    token_address: String,
    symbol: String,
    name: String,
    logo: Option<String>,
    thumbnail: Option<String>,
    balance: String,
    balance_formatted: String,
    possible_spam: Option<bool>,
    usd_price: Option<f64>,
    usd_value: Option<f64>,
    native_token: Option<bool>,
}

impl TokenBalanceRaw {
    fn into_balance(self) -> Option<Balance> {
        if self.possible_spam == Some(true) {
            return None;
        }
        if is_spam_token(&keyword_descriptor(&self.name, &self.symbol)) {
            return None;
        }

        let native = self.native_token == Some(true);
        Some(Balance {
            address: if native { String::new() } else { self.token_address },
            symbol: self.symbol,
            name: self.name,
            logo: self.logo.or(self.thumbnail).or_else(|| {
                native.then(|| ETH_LOGO.to_string())
            }),
            raw_balance: self.balance,
            balance: self.balance_formatted,
            usd_price: self.usd_price,
            usd_value: self.usd_value,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TransactionHistoryResponse {
    result: Vec<TransactionRecordRaw>,
}

#[derive(Debug, Deserialize)]
struct TransactionRecordRaw {
    hash: String,
    from_address: String,
    to_address: Option<String>,
    value: String,
    block_timestamp: String,
    transaction_fee: Option<String>,
    category: Option<String>,
    summary: Option<String>,
    #[serde(default)]
    erc20_transfers: Vec<Erc20TransferRaw>,
    #[serde(default)]
    native_transfers: Vec<NativeTransferRaw>,
}

#[derive(Debug, Deserialize)]
struct Erc20TransferRaw {
    token_name: String,
    token_symbol: String,
    token_logo: Option<String>,
    from_address: String,
    to_address: String,
    value_formatted: String,
    possible_spam: Option<bool>,
    direction: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NativeTransferRaw {
    from_address: String,
    to_address: String,
    value_formatted: String,
    token_symbol: Option<String>,
    token_logo: Option<String>,
}

impl TransactionRecordRaw {
    /// Expand one pre-aggregated record into canonical transactions.
    ///
    /// A record with both sent and received ERC-20 legs is one swap built
    /// from the first leg of each list; otherwise every leg maps on its own
    /// and a leg-less record degrades to its top-level envelope.
    fn into_transactions(self) -> Vec<CanonicalTransaction> {
        let timestamp = parse_block_timestamp(&self.block_timestamp);
        let kind = self
            .category
            .as_deref()
            .map(TransactionKind::from_category)
            .unwrap_or(TransactionKind::Unknown);
        let leg_less = self.erc20_transfers.is_empty() && self.native_transfers.is_empty();

        let mut transactions = Vec::new();

        let sent: Vec<&Erc20TransferRaw> = self
            .erc20_transfers
            .iter()
            .filter(|t| t.direction.as_deref() == Some("send"))
            .collect();
        let received: Vec<&Erc20TransferRaw> = self
            .erc20_transfers
            .iter()
            .filter(|t| t.direction.as_deref() == Some("receive"))
            .collect();

        if let (Some(sent_leg), Some(received_leg)) = (sent.first(), received.first()) {
            transactions.push(CanonicalTransaction {
                hash: self.hash.clone(),
                kind: TransactionKind::Swap,
                from: self.from_address.clone(),
                to: self.to_address.clone().unwrap_or_default(),
                amount: format!(
                    "{} {} ➝ {} {}",
                    compact(&sent_leg.value_formatted),
                    sent_leg.token_symbol,
                    compact(&received_leg.value_formatted),
                    received_leg.token_symbol,
                ),
                token_symbol: None,
                token_name: None,
                token_logo: None,
                usd_value: None,
                fee: self.transaction_fee.clone(),
                summary: self.summary.clone(),
                timestamp,
            });
        } else {
            for transfer in &self.erc20_transfers {
                if transfer.possible_spam == Some(true) {
                    continue;
                }
                if is_spam_token(&keyword_descriptor(
                    &transfer.token_name,
                    &transfer.token_symbol,
                )) {
                    continue;
                }

                transactions.push(CanonicalTransaction {
                    hash: self.hash.clone(),
                    kind,
                    from: transfer.from_address.clone(),
                    to: transfer.to_address.clone(),
                    amount: transfer.value_formatted.clone(),
                    token_symbol: Some(transfer.token_symbol.clone()),
                    token_name: Some(transfer.token_name.clone()),
                    token_logo: transfer.token_logo.clone(),
                    usd_value: None,
                    fee: self.transaction_fee.clone(),
                    summary: self.summary.clone(),
                    timestamp,
                });
            }
        }

        for native in &self.native_transfers {
            transactions.push(CanonicalTransaction {
                hash: self.hash.clone(),
                kind,
                from: native.from_address.clone(),
                to: native.to_address.clone(),
                amount: native.value_formatted.clone(),
                token_symbol: Some(
                    native.token_symbol.clone().unwrap_or_else(|| "ETH".to_string()),
                ),
                token_name: None,
                token_logo: native
                    .token_logo
                    .clone()
                    .or_else(|| Some(ETH_LOGO.to_string())),
                usd_value: None,
                fee: self.transaction_fee.clone(),
                summary: self.summary.clone(),
                timestamp,
            });
        }

        // A record whose legs were all filtered as spam stays filtered; only
        // a genuinely leg-less record degrades to its envelope.
        if transactions.is_empty() && leg_less {
            let amount = match from_base_units(&self.value, 18) {
                Ok(value) => to_compact_display(&value),
                Err(_) => self.value.clone(),
            };
            transactions.push(CanonicalTransaction {
                hash: self.hash,
                kind,
                from: self.from_address,
                to: self.to_address.unwrap_or_default(),
                amount,
                token_symbol: None,
                token_name: None,
                token_logo: None,
                usd_value: None,
                fee: self.transaction_fee,
                summary: self.summary,
                timestamp,
            });
        }

        transactions
    }
}

fn compact(value_formatted: &str) -> String {
    match BigDecimal::from_str(value_formatted) {
        Ok(value) => to_compact_display(&value),
        Err(_) => value_formatted.to_string(),
    }
}

fn parse_block_timestamp(raw: &str) -> i64 {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.timestamp(),
        Err(e) => {
            log::warn!("unparseable block timestamp {:?}: {}", raw, e);
            0
        }
    }
}

/// Minimal descriptor wrapping just the fields the keyword heuristic reads.
fn keyword_descriptor(name: &str, symbol: &str) -> TokenDescriptor {
    TokenDescriptor {
        address: String::new(),
        symbol: Some(symbol.to_string()),
        name: Some(name.to_string()),
        decimals: String::new(),
        image: None,
        total_supply: String::new(),
        price: None,
        holders_count: None,
        issuances_count: None,
    }
}
