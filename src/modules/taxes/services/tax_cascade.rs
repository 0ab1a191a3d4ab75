use rust_decimal::Decimal;
use tracing::debug;

use crate::core::{round_brl, AppError, Result};
use crate::modules::taxes::models::{TaxAmounts, TaxBase, TaxLineRule, TaxMethod};

/// Evaluates an ordered list of tax line rules over a customs value.
///
/// Each line is rounded to cents (half-up) as soon as it is computed and the
/// rounded value is what later bases see. Rounding only the final total gives
/// different cents and is not what the tax authority's forms do.
pub struct TaxCascade;

impl TaxCascade {
    pub fn compute(cif: Decimal, rules: &[TaxLineRule]) -> Result<TaxAmounts> {
        if cif < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "CIF must be non-negative, got {}",
                cif
            )));
        }

        let mut amounts = TaxAmounts::default();
        let mut computed = Vec::with_capacity(rules.len());

        for rule in rules {
            let mut base = Decimal::ZERO;
            for component in &rule.base {
                base += match component {
                    TaxBase::Cif => cif,
                    TaxBase::Tax(kind) if computed.contains(kind) => amounts.get(*kind),
                    TaxBase::Tax(kind) => {
                        return Err(AppError::configuration(format!(
                            "{} base references {} before it is computed",
                            rule.kind, kind
                        )))
                    }
                };
            }

            let amount = Self::apply(rule, base)?;
            debug!(
                "{}: base {} x {} ({:?}) = {}",
                rule.kind, base, rule.rate, rule.method, amount
            );

            amounts.set(rule.kind, amount);
            computed.push(rule.kind);
        }

        Ok(amounts)
    }

    fn apply(rule: &TaxLineRule, base: Decimal) -> Result<Decimal> {
        match rule.method {
            TaxMethod::Simple => Ok(round_brl(base * rule.rate)),
            TaxMethod::GrossUp => {
                let complement = Decimal::ONE - rule.rate;
                if complement <= Decimal::ZERO {
                    return Err(AppError::configuration(format!(
                        "{} gross-up rate must be below 1.0, got {}",
                        rule.kind, rule.rate
                    )));
                }
                Ok(round_brl(base * rule.rate / complement))
            }
        }
    }
}
