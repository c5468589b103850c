//! Human-readable currency amount parsing.
//!
//! Challenges quote amounts as decimal strings in the asset's display unit
//! (`"0.01"` meaning 0.01 USDC), and user-facing metadata quotes them as
//! money strings (`"0.01 USDC"`). This module converts between those forms
//! and the base units a payment rail actually transfers.

use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Matches `"0.01 USDC"`, `"$0.01 USDC"`, or a bare decimal `"0.01"`.
static MONEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\$?\s*([0-9]+(?:\.[0-9]+)?)(?:\s+([A-Za-z][A-Za-z0-9_-]*))?\s*$")
        .expect("money regex is valid")
});

/// Errors produced while parsing or converting amounts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// The input is not a recognizable decimal amount.
    #[error("invalid amount `{0}`")]
    Invalid(String),

    /// The amount is negative.
    #[error("amount `{0}` is negative")]
    Negative(String),

    /// The input carries no asset symbol where one is required.
    #[error("amount `{0}` has no asset symbol")]
    MissingAsset(String),

    /// The amount has more fractional digits than the asset supports.
    #[error("amount `{amount}` cannot be represented with {decimals} decimals")]
    PrecisionLoss {
        /// The offending amount.
        amount: String,
        /// The asset's decimal places.
        decimals: u8,
    },

    /// The amount overflows the base-unit integer range.
    #[error("amount `{0}` overflows base units")]
    Overflow(String),
}

/// Parses a bare decimal amount string (e.g. `"0.01"`).
///
/// Rejects negative and non-numeric input; this is the validation applied
/// to the `amount` field of a payment challenge.
///
/// # Errors
///
/// Returns [`AmountError::Invalid`] for non-decimal input and
/// [`AmountError::Negative`] for negative values.
pub fn parse_decimal(s: &str) -> Result<Decimal, AmountError> {
    let amount = Decimal::from_str(s.trim()).map_err(|_| AmountError::Invalid(s.to_owned()))?;
    if amount.is_sign_negative() {
        return Err(AmountError::Negative(s.to_owned()));
    }
    Ok(amount)
}

/// Converts a decimal amount to base units for an asset with the given
/// number of decimal places (e.g. `0.01` at 6 decimals → `10_000`).
///
/// # Errors
///
/// Returns [`AmountError::PrecisionLoss`] if the amount has more fractional
/// digits than the asset supports, [`AmountError::Overflow`] if the result
/// does not fit in a `u64`, and [`AmountError::Negative`] for negative
/// amounts.
pub fn to_base_units(amount: Decimal, decimals: u8) -> Result<u64, AmountError> {
    if amount.is_sign_negative() {
        return Err(AmountError::Negative(amount.to_string()));
    }
    let scale = 10u64
        .checked_pow(u32::from(decimals))
        .ok_or_else(|| AmountError::Overflow(amount.to_string()))?;
    let scaled = amount
        .checked_mul(Decimal::from(scale))
        .ok_or_else(|| AmountError::Overflow(amount.to_string()))?;
    if scaled.fract() != Decimal::ZERO {
        return Err(AmountError::PrecisionLoss {
            amount: amount.to_string(),
            decimals,
        });
    }
    scaled
        .to_u64()
        .ok_or_else(|| AmountError::Overflow(amount.to_string()))
}

/// A decimal amount paired with its asset symbol.
///
/// This is the human-facing money form (`"0.01 USDC"`) used in challenge
/// summaries and response metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyAmount {
    amount: Decimal,
    asset: String,
}

impl MoneyAmount {
    /// Creates a money amount from a decimal value and asset symbol.
    pub fn new(amount: Decimal, asset: impl Into<String>) -> Self {
        Self {
            amount,
            asset: asset.into(),
        }
    }

    /// Returns the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the asset symbol.
    #[must_use]
    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Converts this amount to base units for the given decimal places.
    ///
    /// # Errors
    ///
    /// See [`to_base_units`].
    pub fn base_units(&self, decimals: u8) -> Result<u64, AmountError> {
        to_base_units(self.amount, decimals)
    }
}

impl fmt::Display for MoneyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.asset)
    }
}

impl FromStr for MoneyAmount {
    type Err = AmountError;

    /// Parses a money string such as `"0.01 USDC"` or `"$1.50 USDC"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = MONEY_RE
            .captures(s)
            .ok_or_else(|| AmountError::Invalid(s.to_owned()))?;
        let amount = parse_decimal(&captures[1])?;
        let asset = captures
            .get(2)
            .ok_or_else(|| AmountError::MissingAsset(s.to_owned()))?;
        Ok(Self::new(amount, asset.as_str()))
    }
}
