use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::modules::taxes::models::ncm_profile::validate_rate;
use crate::modules::taxes::models::TaxKind;

/// Overrides the creditable share of one tax line, optionally only when the
/// line was charged at a specific rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditException {
    pub tax: TaxKind,
    #[serde(default)]
    pub rate: Option<Decimal>,
    pub creditable_fraction: Decimal,
}

/// Which share of each import tax the seller can offset against output taxes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditPolicy {
    pub default_fractions: BTreeMap<TaxKind, Decimal>,
    #[serde(default)]
    pub exceptions: Vec<CreditException>,
}

impl Default for CreditPolicy {
    /// PIS, COFINS, ICMS and IPI fully creditable; II and IOF are cost
    fn default() -> Self {
        let default_fractions = TaxKind::ALL
            .iter()
            .map(|kind| {
                let fraction = match kind {
                    TaxKind::Pis | TaxKind::Cofins | TaxKind::Icms | TaxKind::Ipi => Decimal::ONE,
                    TaxKind::Ii | TaxKind::Iof => Decimal::ZERO,
                };
                (*kind, fraction)
            })
            .collect();

        Self {
            default_fractions,
            exceptions: Vec::new(),
        }
    }
}

impl CreditPolicy {
    pub fn with_exception(mut self, exception: CreditException) -> Self {
        self.exceptions.push(exception);
        self
    }

    /// Creditable fraction for a tax line charged at `applied_rate`.
    /// A rate-specific exception beats a tax-wide one, which beats the default.
    pub fn fraction_for(&self, tax: TaxKind, applied_rate: Decimal) -> Decimal {
        let rate_specific = self
            .exceptions
            .iter()
            .find(|e| e.tax == tax && e.rate == Some(applied_rate));
        let tax_wide = self
            .exceptions
            .iter()
            .find(|e| e.tax == tax && e.rate.is_none());

        rate_specific
            .or(tax_wide)
            .map(|e| e.creditable_fraction)
            .or_else(|| self.default_fractions.get(&tax).copied())
            .unwrap_or(Decimal::ZERO)
    }

    pub fn validate(&self) -> Result<()> {
        for (tax, fraction) in &self.default_fractions {
            validate_rate(&format!("{} creditable fraction", tax), *fraction)?;
        }
        for exception in &self.exceptions {
            validate_rate(
                &format!("{} creditable fraction exception", exception.tax),
                exception.creditable_fraction,
            )?;
            if let Some(rate) = exception.rate {
                validate_rate(&format!("{} exception rate", exception.tax), rate)?;
            }
        }
        Ok(())
    }
}
