//! Search session workflow
//!
//! Drives one validated wallet search end-to-end: validate input → refresh
//! wallet data → pace the transition → record search history. Progress is
//! published on a watch channel so a consuming layer can render state
//! without polling.

use crate::aggregator::{WalletAggregator, WalletSnapshot};
use crate::providers::FetchError;
use crate::store::{StoreError, WalletStore};
use crate::tracker_core::validate::{validate_address, AddressValidation};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::sleep;

/// Observable state of one search session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    InProgress,
    Success,
    /// Terminal success state: data is ready for the consuming layer.
    NavigateToWallet,
    Error(String),
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid wallet address: {0:?}")]
    InvalidAddress(AddressValidation),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Pacing delays between state transitions. Pure UX pacing, not a
/// correctness requirement; tests zero them out.
#[derive(Debug, Clone, Copy)]
pub struct SessionPacing {
    pub success_delay: Duration,
    pub error_delay: Duration,
}

impl Default for SessionPacing {
    fn default() -> Self {
        Self {
            success_delay: Duration::from_millis(500),
            error_delay: Duration::from_millis(1000),
        }
    }
}

pub struct SearchSession {
    aggregator: WalletAggregator,
    store: Arc<WalletStore>,
    pacing: SessionPacing,
    state_tx: watch::Sender<FetchState>,
}

impl SearchSession {
    pub fn new(aggregator: WalletAggregator, store: Arc<WalletStore>) -> Self {
        Self::with_pacing(aggregator, store, SessionPacing::default())
    }

    pub fn with_pacing(
        aggregator: WalletAggregator,
        store: Arc<WalletStore>,
        pacing: SessionPacing,
    ) -> Self {
        let (state_tx, _) = watch::channel(FetchState::Idle);
        Self {
            aggregator,
            store,
            pacing,
            state_tx,
        }
    }

    /// Subscribe to session state transitions.
    pub fn state(&self) -> watch::Receiver<FetchState> {
        self.state_tx.subscribe()
    }

    /// Run one search: validation failures short-circuit before any network
    /// call; a successful fetch records the address in search history
    /// exactly once and ends in `NavigateToWallet`.
    pub async fn search(&self, input: &str) -> Result<WalletSnapshot, SearchError> {
        let address = input.trim();

        let validation = validate_address(address);
        if validation != AddressValidation::Correct {
            let message = match validation {
                AddressValidation::Empty => "Wallet address cannot be empty.",
                _ => "Wallet address format is invalid.",
            };
            self.publish(FetchState::Error(message.to_string()));
            sleep(self.pacing.error_delay).await;
            self.publish(FetchState::Idle);
            return Err(SearchError::InvalidAddress(validation));
        }

        self.publish(FetchState::InProgress);

        match self.aggregator.refresh(address).await {
            Ok(snapshot) => {
                self.publish(FetchState::Success);
                sleep(self.pacing.success_delay).await;
                self.store.add_history(address)?;
                self.publish(FetchState::NavigateToWallet);
                Ok(snapshot)
            }
            Err(e) => {
                self.publish(FetchState::Error(e.user_message().to_string()));
                sleep(self.pacing.error_delay).await;
                self.publish(FetchState::Idle);
                Err(e.into())
            }
        }
    }

    /// Re-fetch an already-open wallet. No history entry is recorded and the
    /// session settles back to `Idle` either way; on error the caller keeps
    /// its previous snapshot.
    pub async fn refresh(&self, address: &str) -> Result<WalletSnapshot, SearchError> {
        self.publish(FetchState::InProgress);

        let outcome = self.aggregator.refresh(address).await;
        match &outcome {
            Ok(_) => self.publish(FetchState::Success),
            Err(e) => self.publish(FetchState::Error(e.user_message().to_string())),
        }
        sleep(self.pacing.error_delay).await;
        self.publish(FetchState::Idle);

        outcome.map_err(SearchError::from)
    }

    fn publish(&self, state: FetchState) {
        // send_replace stores the value even with no live receivers, so a
        // late subscriber still observes the current state.
        self.state_tx.send_replace(state);
    }
}
