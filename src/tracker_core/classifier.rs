//! Transaction kind classification

use serde::{Deserialize, Serialize};

/// Canonical transaction kinds.
///
/// Upstream category strings map in case-insensitively with underscores
/// normalized to spaces; anything unrecognized becomes `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Send,
    Receive,
    TokenSend,
    TokenReceive,
    Deposit,
    Withdraw,
    Swap,
    Airdrop,
    Mint,
    Burn,
    NftPurchase,
    NftSale,
    Borrow,
    Approve,
    Revoke,
    ContractInteraction,
    Unknown,
}

const ALL_KINDS: [TransactionKind; 17] = [
    TransactionKind::Send,
    TransactionKind::Receive,
    TransactionKind::TokenSend,
    TransactionKind::TokenReceive,
    TransactionKind::Deposit,
    TransactionKind::Withdraw,
    TransactionKind::Swap,
    TransactionKind::Airdrop,
    TransactionKind::Mint,
    TransactionKind::Burn,
    TransactionKind::NftPurchase,
    TransactionKind::NftSale,
    TransactionKind::Borrow,
    TransactionKind::Approve,
    TransactionKind::Revoke,
    TransactionKind::ContractInteraction,
    TransactionKind::Unknown,
];

impl TransactionKind {
    /// Canonical name matched against normalized upstream categories.
    fn canonical_name(self) -> &'static str {
        match self {
            TransactionKind::Send => "send",
            TransactionKind::Receive => "receive",
            TransactionKind::TokenSend => "token send",
            TransactionKind::TokenReceive => "token receive",
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdraw => "withdraw",
            TransactionKind::Swap => "swap",
            TransactionKind::Airdrop => "airdrop",
            TransactionKind::Mint => "mint",
            TransactionKind::Burn => "burn",
            TransactionKind::NftPurchase => "nft purchase",
            TransactionKind::NftSale => "nft sale",
            TransactionKind::Borrow => "borrow",
            TransactionKind::Approve => "approve",
            TransactionKind::Revoke => "revoke",
            TransactionKind::ContractInteraction => "contract interaction",
            TransactionKind::Unknown => "unknown",
        }
    }

    /// Display label for feed rendering.
    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::Send => "Sent",
            TransactionKind::Receive => "Received",
            TransactionKind::TokenSend => "Sent",
            TransactionKind::TokenReceive => "Received",
            TransactionKind::Deposit => "Deposited",
            TransactionKind::Withdraw => "Withdrawn",
            TransactionKind::Swap => "Swapped",
            TransactionKind::Airdrop => "Airdrop",
            TransactionKind::Mint => "Minted",
            TransactionKind::Burn => "Burned",
            TransactionKind::NftPurchase => "Purchased",
            TransactionKind::NftSale => "Sold",
            TransactionKind::Borrow => "Borrowed",
            TransactionKind::Approve => "Approved",
            TransactionKind::Revoke => "Revoked",
            TransactionKind::ContractInteraction => "Interacted with contract",
            TransactionKind::Unknown => "Unknown transaction",
        }
    }

    /// Sign prefix the presentation layer puts in front of the amount.
    ///
    /// Swaps carry a composite amount string and take no sign.
    pub fn amount_sign(self) -> &'static str {
        match self {
            TransactionKind::Receive
            | TransactionKind::TokenReceive
            | TransactionKind::Deposit
            | TransactionKind::Airdrop
            | TransactionKind::Mint => "+",
            TransactionKind::Send
            | TransactionKind::TokenSend
            | TransactionKind::Withdraw
            | TransactionKind::Burn => "-",
            _ => "",
        }
    }

    /// Map an upstream category string, falling back to `Unknown`.
    pub fn from_category(category: &str) -> TransactionKind {
        Self::try_from_category(category).unwrap_or(TransactionKind::Unknown)
    }

    fn try_from_category(category: &str) -> Option<TransactionKind> {
        let normalized = category.trim().to_lowercase().replace('_', " ");
        ALL_KINDS
            .iter()
            .copied()
            .find(|kind| kind.canonical_name() == normalized)
    }
}

/// Classify one transfer record relative to the observed wallet.
///
/// Category hints win; otherwise direction against the observed wallet
/// decides, and anything left over is `Unknown`. Total: never panics.
pub fn classify(
    category: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    observed_wallet: &str,
) -> TransactionKind {
    if let Some(kind) = category.and_then(TransactionKind::try_from_category) {
        return kind;
    }

    if from.is_some_and(|f| f.eq_ignore_ascii_case(observed_wallet)) {
        return TransactionKind::Send;
    }
    if to.is_some_and(|t| t.eq_ignore_ascii_case(observed_wallet)) {
        return TransactionKind::Receive;
    }

    TransactionKind::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET: &str = "0x112532B200980Ddee8226023bEbBE2E6884C31e2";

    #[test]
    fn test_category_mapping_is_case_insensitive() {
        assert_eq!(
            TransactionKind::from_category("TOKEN_SEND"),
            TransactionKind::TokenSend
        );
        assert_eq!(
            TransactionKind::from_category("token send"),
            TransactionKind::TokenSend
        );
        assert_eq!(
            TransactionKind::from_category("Nft Purchase"),
            TransactionKind::NftPurchase
        );
        assert_eq!(TransactionKind::from_category("mint"), TransactionKind::Mint);
    }

    #[test]
    fn test_unrecognized_category_falls_back_to_unknown() {
        assert_eq!(
            TransactionKind::from_category("garbage_value"),
            TransactionKind::Unknown
        );
        assert_eq!(TransactionKind::from_category(""), TransactionKind::Unknown);
    }

    #[test]
    fn test_classify_prefers_category_hint() {
        let kind = classify(Some("burn"), Some(WALLET), None, WALLET);
        assert_eq!(kind, TransactionKind::Burn);
    }

    #[test]
    fn test_classify_direction_fallback() {
        let sent = classify(None, Some(&WALLET.to_lowercase()), Some("0xdead"), WALLET);
        assert_eq!(sent, TransactionKind::Send);

        let received = classify(None, Some("0xdead"), Some(WALLET), WALLET);
        assert_eq!(received, TransactionKind::Receive);
    }

    #[test]
    fn test_classify_garbage_never_panics() {
        let kind = classify(Some("garbage_value"), Some("0xaaa"), Some("0xbbb"), WALLET);
        assert_eq!(kind, TransactionKind::Unknown);
    }

    #[test]
    fn test_amount_signs() {
        assert_eq!(TransactionKind::Receive.amount_sign(), "+");
        assert_eq!(TransactionKind::TokenSend.amount_sign(), "-");
        assert_eq!(TransactionKind::Swap.amount_sign(), "");
        assert_eq!(TransactionKind::Approve.amount_sign(), "");
    }
}
