// Tax regimes as configuration data.
//
// Both regimes expand into an ordered list of tax line rules that the single
// cascade in `services::tax_cascade` evaluates. Each rule names the amounts
// its base is built from; a base may only reference taxes computed earlier.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};
use crate::modules::taxes::models::ncm_profile::validate_rate;
use crate::modules::taxes::models::{NcmTaxProfile, TaxKind};

/// Component of a tax line's base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxBase {
    /// Customs value (cost, insurance and freight)
    Cif,
    /// A tax computed earlier in the cascade
    Tax(TaxKind),
}

/// How the rate is applied to the base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxMethod {
    /// `base × rate`
    Simple,
    /// `base × rate / (1 − rate)`: the tax is part of its own base
    GrossUp,
}

/// One step of the cascade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxLineRule {
    pub kind: TaxKind,
    pub rate: Decimal,
    pub base: Vec<TaxBase>,
    pub method: TaxMethod,
}

impl TaxLineRule {
    pub fn simple(kind: TaxKind, rate: Decimal, base: Vec<TaxBase>) -> Self {
        Self {
            kind,
            rate,
            base,
            method: TaxMethod::Simple,
        }
    }

    pub fn gross_up(kind: TaxKind, rate: Decimal, base: Vec<TaxBase>) -> Self {
        Self {
            kind,
            rate,
            base,
            method: TaxMethod::GrossUp,
        }
    }
}

/// Import tax regime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "regime", rename_all = "snake_case")]
pub enum TaxRuleSet {
    /// II, IPI, PIS and COFINS from the product's NCM profile; ICMS gross-up
    NcmDriven { icms_rate: Decimal },
    /// Legacy regime with fixed rates for every product and no import duty
    FixedRates {
        iof_rate: Decimal,
        ipi_rate: Decimal,
        pis_rate: Decimal,
        cofins_rate: Decimal,
        icms_rate: Decimal,
    },
}

impl TaxRuleSet {
    pub fn name(&self) -> &'static str {
        match self {
            TaxRuleSet::NcmDriven { .. } => "ncm_driven",
            TaxRuleSet::FixedRates { .. } => "fixed_rates",
        }
    }

    /// Expand the regime into cascade rules for a product's profile.
    /// The fixed regime ignores the profile.
    pub fn rules_for(&self, profile: &NcmTaxProfile) -> Vec<TaxLineRule> {
        use TaxBase::{Cif, Tax};
        use TaxKind::*;

        match self {
            TaxRuleSet::NcmDriven { icms_rate } => vec![
                TaxLineRule::simple(Ii, profile.ii_rate, vec![Cif]),
                TaxLineRule::simple(Ipi, profile.ipi_rate, vec![Cif, Tax(Ii)]),
                TaxLineRule::simple(Pis, profile.pis_rate, vec![Cif]),
                TaxLineRule::simple(Cofins, profile.cofins_rate, vec![Cif]),
                TaxLineRule::gross_up(
                    Icms,
                    *icms_rate,
                    vec![Cif, Tax(Ii), Tax(Ipi), Tax(Pis), Tax(Cofins)],
                ),
            ],
            TaxRuleSet::FixedRates {
                iof_rate,
                ipi_rate,
                pis_rate,
                cofins_rate,
                icms_rate,
            } => vec![
                TaxLineRule::simple(Iof, *iof_rate, vec![Cif]),
                TaxLineRule::simple(Ipi, *ipi_rate, vec![Cif]),
                TaxLineRule::simple(Pis, *pis_rate, vec![Cif]),
                TaxLineRule::simple(Cofins, *cofins_rate, vec![Cif]),
                TaxLineRule::gross_up(
                    Icms,
                    *icms_rate,
                    vec![Cif, Tax(Iof), Tax(Ipi), Tax(Pis), Tax(Cofins)],
                ),
            ],
        }
    }

    /// Validate the regime's own rates and the ordering of its rules
    pub fn validate(&self, sample_profile: &NcmTaxProfile) -> Result<()> {
        validate_rules(&self.rules_for(sample_profile))
    }
}

/// Check rates and that every base only references taxes computed earlier
pub fn validate_rules(rules: &[TaxLineRule]) -> Result<()> {
    let mut computed: Vec<TaxKind> = Vec::with_capacity(rules.len());

    for rule in rules {
        validate_rate(&format!("{} rate", rule.kind), rule.rate)?;

        if rule.method == TaxMethod::GrossUp && rule.rate >= Decimal::ONE {
            return Err(AppError::configuration(format!(
                "{} gross-up rate must be below 1.0, got {}",
                rule.kind, rule.rate
            )));
        }

        if computed.contains(&rule.kind) {
            return Err(AppError::configuration(format!(
                "{} appears more than once in the tax rules",
                rule.kind
            )));
        }

        for component in &rule.base {
            if let TaxBase::Tax(dependency) = component {
                if !computed.contains(dependency) {
                    return Err(AppError::configuration(format!(
                        "{} base references {} which is not computed before it",
                        rule.kind, dependency
                    )));
                }
            }
        }

        computed.push(rule.kind);
    }

    Ok(())
}
