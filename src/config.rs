use crate::providers::{ethplorer, moralis};
use std::env;

/// Which upstream wire shape to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Ethplorer,
    Moralis,
}

impl ProviderKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "ethplorer" => Some(ProviderKind::Ethplorer),
            "moralis" => Some(ProviderKind::Moralis),
            _ => None,
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::Ethplorer => ethplorer::DEFAULT_BASE_URL,
            ProviderKind::Moralis => moralis::DEFAULT_BASE_URL,
        }
    }
}

/// Configuration loaded from environment variables
pub struct Config {
    pub provider: ProviderKind,
    pub api_key: String,
    pub base_url: String,
    pub db_path: String,
    pub page_limit: u32,
    pub rust_log: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// WALLET_PROVIDER selects the upstream shape (ethplorer | moralis,
    /// default ethplorer). WALLET_API_KEY must be set; everything else has
    /// defaults.
    pub fn from_env() -> Self {
        let provider = env::var("WALLET_PROVIDER")
            .ok()
            .and_then(|raw| ProviderKind::parse(&raw))
            .unwrap_or(ProviderKind::Ethplorer);

        let api_key =
            env::var("WALLET_API_KEY").expect("WALLET_API_KEY must be set in .env file");

        let base_url = env::var("WALLET_API_BASE_URL")
            .unwrap_or_else(|_| provider.default_base_url().to_string());

        let db_path =
            env::var("WALLETFLOW_DB_PATH").unwrap_or_else(|_| "data/walletflow.db".to_string());

        let page_limit = env::var("HISTORY_PAGE_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1000);

        let rust_log = env::var("RUST_LOG").ok();

        Self {
            provider,
            api_key,
            base_url,
            db_path,
            page_limit,
            rust_log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!(ProviderKind::parse("ethplorer"), Some(ProviderKind::Ethplorer));
        assert_eq!(ProviderKind::parse(" Moralis "), Some(ProviderKind::Moralis));
        assert_eq!(ProviderKind::parse("etherscan"), None);
    }
}
