//! Multi-source wallet data aggregation
//!
//! One logical refresh fans out the balance and history fetches as sibling
//! tasks and joins them fail-fast: the first error surfaces and the sibling
//! future is dropped, which cancels its in-flight request. A partial result
//! is never presented as a complete one.

use crate::providers::{FetchError, WalletProvider};
use crate::tracker_core::types::{CanonicalTransaction, Portfolio};
use std::sync::Arc;

/// Complete result of one wallet refresh.
#[derive(Debug, Clone)]
pub struct WalletSnapshot {
    pub address: String,
    pub portfolio: Portfolio,
    pub transactions: Vec<CanonicalTransaction>,
    pub fetched_at: i64,
}

pub struct WalletAggregator {
    provider: Arc<dyn WalletProvider>,
}

impl WalletAggregator {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self { provider }
    }

    pub async fn fetch_portfolio(&self, address: &str) -> Result<Portfolio, FetchError> {
        self.provider.fetch_balances(address).await
    }

    /// Fetch the canonical transaction feed, sorted by timestamp descending.
    pub async fn fetch_history(
        &self,
        address: &str,
    ) -> Result<Vec<CanonicalTransaction>, FetchError> {
        let mut transactions = self.provider.fetch_history(address).await?;
        transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(transactions)
    }

    /// Refresh balances and history concurrently.
    ///
    /// Either failure fails the whole refresh; the caller keeps whatever it
    /// was displaying before (non-destructive failure policy).
    pub async fn refresh(&self, address: &str) -> Result<WalletSnapshot, FetchError> {
        let (portfolio, transactions) = tokio::try_join!(
            self.fetch_portfolio(address),
            self.fetch_history(address),
        )?;

        Ok(WalletSnapshot {
            address: address.to_string(),
            portfolio,
            transactions,
            fetched_at: chrono::Utc::now().timestamp(),
        })
    }
}
