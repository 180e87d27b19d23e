//! Integration tests for the refresh/search workflow
//!
//! A mock provider with call counters stands in for the upstream API so the
//! tests can pin down the concurrency contract: fail-fast refresh, zero
//! network calls on invalid input, and exactly one history entry per
//! successful search.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use walletflow::providers::{FetchError, WalletProvider};
use walletflow::session::{FetchState, SearchError, SearchSession, SessionPacing};
use walletflow::store::WalletStore;
use walletflow::tracker_core::types::{Balance, CanonicalTransaction, Portfolio};
use walletflow::tracker_core::{AddressValidation, TransactionKind};
use walletflow::WalletAggregator;

const WALLET: &str = "0x112532B200980Ddee8226023bEbBE2E6884C31e2";

struct MockProvider {
    fail_balances: bool,
    fail_history: bool,
    balance_calls: AtomicUsize,
    history_calls: AtomicUsize,
}

impl MockProvider {
    fn new(fail_balances: bool, fail_history: bool) -> Arc<Self> {
        Arc::new(Self {
            fail_balances,
            fail_history,
            balance_calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
        })
    }
}

fn make_transaction(hash: &str, timestamp: i64) -> CanonicalTransaction {
    CanonicalTransaction {
        hash: hash.to_string(),
        kind: TransactionKind::Receive,
        from: "0xother".to_string(),
        to: WALLET.to_string(),
        amount: "1".to_string(),
        token_symbol: Some("TKN".to_string()),
        token_name: None,
        token_logo: None,
        usd_value: None,
        fee: None,
        summary: None,
        timestamp,
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn fetch_balances(&self, _address: &str) -> Result<Portfolio, FetchError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_balances {
            return Err(FetchError::NotFound);
        }
        Ok(Portfolio {
            balances: vec![Balance {
                address: String::new(),
                symbol: "ETH".to_string(),
                name: "Ethereum".to_string(),
                logo: None,
                raw_balance: "1000000000000000000".to_string(),
                balance: "1".to_string(),
                usd_price: Some(2000.0),
                usd_value: Some(2000.0),
            }],
        })
    }

    async fn fetch_history(
        &self,
        _address: &str,
    ) -> Result<Vec<CanonicalTransaction>, FetchError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_history {
            return Err(FetchError::ServiceUnavailable);
        }
        // Deliberately unsorted: the aggregator owns ordering.
        Ok(vec![
            make_transaction("0xold", 1700000000),
            make_transaction("0xnew", 1700009999),
            make_transaction("0xmid", 1700005000),
        ])
    }
}

fn zero_pacing() -> SessionPacing {
    SessionPacing {
        success_delay: Duration::ZERO,
        error_delay: Duration::ZERO,
    }
}

fn make_session(provider: Arc<MockProvider>) -> (SearchSession, Arc<WalletStore>) {
    let store = Arc::new(WalletStore::open_in_memory().unwrap());
    let session = SearchSession::with_pacing(
        WalletAggregator::new(provider),
        store.clone(),
        zero_pacing(),
    );
    (session, store)
}

#[tokio::test]
async fn test_refresh_is_fail_fast_when_history_fails() {
    let provider = MockProvider::new(false, true);
    let aggregator = WalletAggregator::new(provider.clone());

    let result = aggregator.refresh(WALLET).await;
    assert!(matches!(result, Err(FetchError::ServiceUnavailable)));
}

#[tokio::test]
async fn test_refresh_is_fail_fast_when_balances_fail() {
    let provider = MockProvider::new(true, false);
    let aggregator = WalletAggregator::new(provider.clone());

    let result = aggregator.refresh(WALLET).await;
    assert!(matches!(result, Err(FetchError::NotFound)));
}

#[tokio::test]
async fn test_history_sorted_descending() {
    let provider = MockProvider::new(false, false);
    let aggregator = WalletAggregator::new(provider.clone());

    let transactions = aggregator.fetch_history(WALLET).await.unwrap();
    let timestamps: Vec<i64> = transactions.iter().map(|t| t.timestamp).collect();
    assert_eq!(timestamps, vec![1700009999, 1700005000, 1700000000]);
}

#[tokio::test]
async fn test_search_success_ends_in_navigate_and_records_history() {
    let provider = MockProvider::new(false, false);
    let (session, store) = make_session(provider.clone());
    let state = session.state();

    let snapshot = session.search(WALLET).await.unwrap();
    assert_eq!(snapshot.portfolio.balances.len(), 1);
    assert_eq!(snapshot.transactions.len(), 3);
    assert_eq!(*state.borrow(), FetchState::NavigateToWallet);

    let history = store.list_history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].address, WALLET);
}

#[tokio::test]
async fn test_search_failure_keeps_history_empty_and_settles_idle() {
    let provider = MockProvider::new(false, true);
    let (session, store) = make_session(provider.clone());
    let state = session.state();

    let result = session.search(WALLET).await;
    assert!(matches!(
        result,
        Err(SearchError::Fetch(FetchError::ServiceUnavailable))
    ));
    assert_eq!(*state.borrow(), FetchState::Idle);
    assert!(store.list_history().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_address_blocks_before_any_network_call() {
    let provider = MockProvider::new(false, false);
    let (session, store) = make_session(provider.clone());

    let result = session.search("").await;
    assert!(matches!(
        result,
        Err(SearchError::InvalidAddress(AddressValidation::Empty))
    ));
    assert_eq!(provider.balance_calls.load(Ordering::SeqCst), 0);
    assert_eq!(provider.history_calls.load(Ordering::SeqCst), 0);
    assert!(store.list_history().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_address_blocks_before_any_network_call() {
    let provider = MockProvider::new(false, false);
    let (session, _store) = make_session(provider.clone());

    let result = session.search("not-an-address").await;
    assert!(matches!(
        result,
        Err(SearchError::InvalidAddress(AddressValidation::Incorrect))
    ));
    assert_eq!(provider.balance_calls.load(Ordering::SeqCst), 0);
    assert_eq!(provider.history_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_refresh_does_not_record_history() {
    let provider = MockProvider::new(false, false);
    let (session, store) = make_session(provider.clone());

    session.refresh(WALLET).await.unwrap();
    assert!(store.list_history().unwrap().is_empty());
}
