use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::round_brl;
use crate::modules::taxes::models::{CreditPolicy, TaxAmounts, TaxLineRule};

/// Creditable portion of each import tax
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditBreakdown {
    pub amounts: TaxAmounts,
    pub total: Decimal,
}

impl CreditBreakdown {
    pub fn add(&self, other: &CreditBreakdown) -> CreditBreakdown {
        CreditBreakdown {
            amounts: self.amounts.add(&other.amounts),
            total: self.total + other.total,
        }
    }
}

/// Nets creditable import taxes against the imported cost
pub struct ImportCreditCalculator;

impl ImportCreditCalculator {
    /// Creditable amounts for taxes computed under `rules`.
    /// Lines absent from `rules` were not charged and carry no credit.
    pub fn credits(taxes: &TaxAmounts, rules: &[TaxLineRule], policy: &CreditPolicy) -> CreditBreakdown {
        let mut amounts = TaxAmounts::default();

        for rule in rules {
            let fraction = policy.fraction_for(rule.kind, rule.rate);
            amounts.set(rule.kind, round_brl(taxes.get(rule.kind) * fraction));
        }

        CreditBreakdown {
            total: amounts.total(),
            amounts,
        }
    }

    /// `imported_cost − credits`, clamped at zero.
    /// Returns the base and whether clamping happened.
    pub fn post_credit_base(imported_cost: Decimal, credits: Decimal) -> (Decimal, bool) {
        let base = imported_cost - credits;
        if base < Decimal::ZERO {
            warn!(
                "Creditable taxes {} exceed imported cost {}; clamping post-credit base to zero",
                credits, imported_cost
            );
            (Decimal::ZERO, true)
        } else {
            (base, false)
        }
    }
}
