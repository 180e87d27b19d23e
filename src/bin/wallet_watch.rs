//! Wallet Watch - one-shot wallet refresh from the command line
//!
//! Validates the address, fetches balances and history concurrently from
//! the configured provider, and prints the portfolio and transaction feed.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin wallet_watch -- 0x112532B200980Ddee8226023bEbBE2E6884C31e2
//! ```
//!
//! ## Environment Variables
//!
//! - WALLET_API_KEY - upstream API key (required)
//! - WALLET_PROVIDER - ethplorer | moralis (default: ethplorer)
//! - WALLET_API_BASE_URL - base URL override (default: provider's public API)
//! - WALLETFLOW_DB_PATH - SQLite path for favorites/history (default: data/walletflow.db)
//! - HISTORY_PAGE_LIMIT - upstream page bound (default: 1000)
//! - RUST_LOG - Logging level (optional, default: info)

use std::env;
use std::sync::Arc;

use walletflow::config::{Config, ProviderKind};
use walletflow::providers::{EthplorerProvider, MoralisProvider, WalletProvider};
use walletflow::session::{SearchSession, SessionPacing};
use walletflow::store::WalletStore;
use walletflow::tracker_core::format::{abbreviate_address, format_timestamp, to_currency_display};
use walletflow::WalletAggregator;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    let address = match env::args().nth(1) {
        Some(address) => address,
        None => {
            eprintln!("usage: wallet_watch <0x-address>");
            std::process::exit(2);
        }
    };

    let config = Config::from_env();

    log::info!("🚀 Starting Wallet Watch");
    log::info!("   Provider: {:?}", config.provider);
    log::info!("   Base URL: {}", config.base_url);
    log::info!("   DB path: {}", config.db_path);
    log::info!("   Wallet: {}", abbreviate_address(&address));

    let provider: Arc<dyn WalletProvider> = match config.provider {
        ProviderKind::Ethplorer => Arc::new(EthplorerProvider::new(
            &config.base_url,
            &config.api_key,
            config.page_limit,
        )?),
        ProviderKind::Moralis => {
            Arc::new(MoralisProvider::new(&config.base_url, &config.api_key)?)
        }
    };

    if let Some(parent) = std::path::Path::new(&config.db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = Arc::new(WalletStore::open(&config.db_path)?);

    let aggregator = WalletAggregator::new(provider);
    let session = SearchSession::with_pacing(aggregator, store.clone(), SessionPacing::default());

    let snapshot = match session.search(&address).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            log::error!("❌ Search failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("Portfolio for {}", snapshot.address);
    println!(
        "  total value: {}",
        to_currency_display(snapshot.portfolio.total_usd())
    );
    for balance in &snapshot.portfolio.balances {
        let value = balance
            .usd_value
            .map(to_currency_display)
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<8} {:>24}  {}", balance.symbol, balance.balance, value);
    }

    println!();
    println!("Transactions ({}):", snapshot.transactions.len());
    for tx in &snapshot.transactions {
        println!(
            "  {}  {:<24} {}{}",
            format_timestamp(tx.timestamp, false),
            tx.kind.label(),
            tx.kind.amount_sign(),
            tx.amount,
        );
    }

    if store.is_favorite(&snapshot.address)? {
        log::info!("⭐ {} is a favorite wallet", abbreviate_address(&snapshot.address));
    }

    log::info!("✅ Refresh complete");
    Ok(())
}
