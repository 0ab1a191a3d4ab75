use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{bounded_brl, checked_sum, round_brl, AppError, Result};

/// Customs value and its components, in BRL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomsValue {
    pub fob: Decimal,
    pub freight: Decimal,
    pub insurance: Decimal,
    pub cif: Decimal,
    /// Insurance came from the default rate rather than the caller
    pub insurance_defaulted: bool,
}

/// Combines FOB, freight and insurance into the customs value (CIF)
pub struct CifAssembler;

impl CifAssembler {
    /// `insurance` defaults to `insurance_rate × (FOB + freight)` when absent
    pub fn assemble(
        fob: Decimal,
        freight: Decimal,
        insurance: Option<Decimal>,
        insurance_rate: Decimal,
    ) -> Result<CustomsValue> {
        if fob < Decimal::ZERO {
            return Err(AppError::validation(format!("FOB must be non-negative, got {}", fob)));
        }

        if freight < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Freight must be non-negative, got {}",
                freight
            )));
        }

        let fob = bounded_brl(fob, "FOB value")?;
        let freight = bounded_brl(round_brl(freight), "freight")?;

        let (insurance, insurance_defaulted) = match insurance {
            Some(value) if value < Decimal::ZERO => {
                return Err(AppError::validation(format!(
                    "Insurance must be non-negative, got {}",
                    value
                )))
            }
            Some(value) => (bounded_brl(round_brl(value), "insurance")?, false),
            None => (round_brl((fob + freight) * insurance_rate), true),
        };

        Ok(CustomsValue {
            fob,
            freight,
            insurance,
            cif: checked_sum([fob, freight, insurance], "customs value")?,
            insurance_defaulted,
        })
    }
}
