//! Input checks for values typed in by players before they reach the market data.
//!
//! [`check_buyable_set`] and [`is_valid_buy_sell`] guard market rows as they are
//! loaded. [`parse_price`] and [`validate_pin_format`] are for front ends that
//! accept price reports or PIN logins; nothing in this crate takes such input.

use thiserror::Error;

/// Every settlement offers exactly this many products for purchase.
pub const BUYABLE_PRODUCTS_COUNT: usize = 3;

/// Upper bound accepted for a single buy or sell price.
pub const MAX_PRICE_VALUE: u64 = 9_999_999;

/// Digits in a login PIN.
pub const PIN_LENGTH: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("expected {expected} buyable products, got {actual}")]
    BuyableCount { expected: usize, actual: usize },
    #[error("buyable product at position {0} is empty")]
    EmptyBuyable(usize),
    #[error("price {0} exceeds the maximum of {max}", max = MAX_PRICE_VALUE)]
    PriceTooLarge(u64),
}

/// Parses a price field. Only plain decimal digits are accepted; surrounding
/// whitespace is ignored.
pub fn parse_price(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    trimmed
        .parse::<u64>()
        .ok()
        .filter(|value| *value <= MAX_PRICE_VALUE)
}

pub fn check_price(price: u64) -> Result<(), ValidationError> {
    if price > MAX_PRICE_VALUE {
        return Err(ValidationError::PriceTooLarge(price));
    }
    Ok(())
}

/// Both sides may be absent; present values must be in range.
pub fn is_valid_buy_sell(buy: Option<u64>, sell: Option<u64>) -> bool {
    [buy, sell]
        .into_iter()
        .flatten()
        .all(|price| check_price(price).is_ok())
}

pub fn validate_pin_format(pin: &str) -> bool {
    pin.len() == PIN_LENGTH && pin.bytes().all(|b| b.is_ascii_digit())
}

pub fn check_buyable_set<S: AsRef<str>>(ids: &[S]) -> Result<(), ValidationError> {
    if ids.len() != BUYABLE_PRODUCTS_COUNT {
        return Err(ValidationError::BuyableCount {
            expected: BUYABLE_PRODUCTS_COUNT,
            actual: ids.len(),
        });
    }
    if let Some(position) = ids.iter().position(|id| id.as_ref().trim().is_empty()) {
        return Err(ValidationError::EmptyBuyable(position));
    }
    Ok(())
}
