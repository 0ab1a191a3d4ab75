use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::AppError;

/// Decimal places kept for every money amount the engine produces
pub const MONEY_SCALE: u32 = 2;

/// Largest BRL amount (one quadrillion) accepted for a customs component,
/// an expense or an imported cost. Tax gross-ups and the resale division
/// multiply by at most 10^6, which keeps every result inside `Decimal`.
pub const MAX_BRL_AMOUNT_UNITS: i64 = 1_000_000_000_000_000;

/// Currencies that appear in an import quotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Brazilian Real, the currency every cost is reported in
    BRL,
    /// Chinese Yuan, the usual origin currency of supplier prices
    CNY,
    /// US Dollar, carried as the secondary reference rate
    USD,
}

impl Currency {
    /// Returns the decimal scale for this currency
    pub fn scale(&self) -> u32 {
        MONEY_SCALE
    }

    /// Rounds a decimal value to the scale of this currency, half-up
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.scale(), RoundingStrategy::MidpointAwayFromZero)
    }

    /// Validates that a decimal value has the correct scale for this currency
    pub fn validate_amount(&self, amount: Decimal) -> Result<(), String> {
        let scale = amount.scale();
        let expected_scale = self.scale();

        if scale > expected_scale {
            return Err(format!(
                "{} amounts must have at most {} decimal places, got {}",
                self, expected_scale, scale
            ));
        }

        if amount < Decimal::ZERO {
            return Err(format!("{} amount cannot be negative", self));
        }

        Ok(())
    }

    /// Returns the smallest unit for this currency
    pub fn smallest_unit(&self) -> Decimal {
        Decimal::new(1, self.scale())
    }

    /// Formats an amount for display with the correct decimal places
    pub fn format_amount(&self, amount: Decimal) -> String {
        format!(
            "{} {:.width$}",
            self,
            self.round(amount),
            width = self.scale() as usize
        )
    }
}

/// Rounds a BRL amount to cents with round-half-up.
///
/// Every tax line, share and total passes through here exactly once when it
/// is produced; chained rounding is part of the business rule.
pub fn round_brl(amount: Decimal) -> Decimal {
    Currency::BRL.round(amount)
}

/// Rejects BRL amounts above `MAX_BRL_AMOUNT_UNITS`
pub fn bounded_brl(amount: Decimal, what: &str) -> Result<Decimal, AppError> {
    if amount > Decimal::from(MAX_BRL_AMOUNT_UNITS) {
        return Err(AppError::overflow(what));
    }
    Ok(amount)
}

/// Sum that reports overflow as a validation error instead of panicking
pub fn checked_sum<I>(values: I, what: &str) -> Result<Decimal, AppError>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value))
        .ok_or_else(|| AppError::overflow(what))
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::BRL => write!(f, "BRL"),
            Currency::CNY => write!(f, "CNY"),
            Currency::USD => write!(f, "USD"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BRL" => Ok(Currency::BRL),
            "CNY" | "RMB" => Ok(Currency::CNY),
            "USD" => Ok(Currency::USD),
            _ => Err(format!("Invalid currency: {}", s)),
        }
    }
}

impl TryFrom<&str> for Currency {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}
