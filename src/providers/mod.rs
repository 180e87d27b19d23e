//! Upstream indexing API providers
//!
//! Two incompatible wire shapes exist for the same data; each gets its own
//! implementation of [`WalletProvider`] producing the canonical model, so
//! the pipeline never hard-codes a provider choice.
//!
//! - [`EthplorerProvider`]: flat per-transfer operations requiring
//!   hash-correlation, plus a separate native-transfer feed.
//! - [`MoralisProvider`]: pre-aggregated per-transaction records with
//!   embedded transfer lists.

pub mod error;
pub mod ethplorer;
pub mod moralis;

pub use error::FetchError;
pub use ethplorer::EthplorerProvider;
pub use moralis::MoralisProvider;

use crate::tracker_core::types::{CanonicalTransaction, Portfolio};
use async_trait::async_trait;

/// Capability surface of one upstream indexing API.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Fetch the wallet's current portfolio snapshot, spam-filtered.
    async fn fetch_balances(&self, address: &str) -> Result<Portfolio, FetchError>;

    /// Fetch the wallet's transaction feed in canonical form, unsorted.
    async fn fetch_history(&self, address: &str)
        -> Result<Vec<CanonicalTransaction>, FetchError>;
}
