//! Wallet address validation
//!
//! Runs before any network call: an invalid input must never reach a
//! provider.

use once_cell::sync::Lazy;
use regex::Regex;

static ADDRESS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new("^0x[a-fA-F0-9]{40}$").expect("address pattern is valid"));

/// Empty input and wrong-shape input are distinct failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressValidation {
    Correct,
    Empty,
    Incorrect,
}

pub fn validate_address(input: &str) -> AddressValidation {
    if input.is_empty() {
        AddressValidation::Empty
    } else if !ADDRESS_PATTERN.is_match(input) {
        AddressValidation::Incorrect
    } else {
        AddressValidation::Correct
    }
}
