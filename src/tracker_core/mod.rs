//! Tracker Core - Normalization & Classification Pipeline
//!
//! This module holds the pure components of the wallet tracker: every
//! function here is referentially transparent given its inputs, which keeps
//! the pipeline testable without any provider wiring.
//!
//! # Architecture
//!
//! ```text
//! Raw API page → RawTransferRecord (per leg)
//!     ↓
//! spam filter (keyword + structural red flags)
//!     ↓
//! swap correlator (hash-group collapse) → classifier (kind per record)
//!     ↓
//! format (base units → BigDecimal → compact display)
//!     ↓
//! CanonicalTransaction feed
//! ```

pub mod classifier;
pub mod format;
pub mod spam;
pub mod swap;
pub mod types;
pub mod validate;

pub use classifier::{classify, TransactionKind};
pub use format::{
    abbreviate_address, format_timestamp, from_base_units, to_compact_display,
    to_currency_display, to_plain_display, InvalidAmountError,
};
pub use spam::{is_spam_token, is_spam_transfer};
pub use swap::collapse_swaps;
pub use types::{
    Balance, CanonicalTransaction, Portfolio, RawTransferRecord, TokenDescriptor, TokenPrice,
};
pub use validate::{validate_address, AddressValidation};
