use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{round_brl, AppError, Result};
use crate::modules::taxes::models::ncm_profile::validate_rate;

/// Taxes and fees charged on the domestic resale, as fractions of the price.
/// Construction guarantees the combined rate stays below 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResaleTaxRate {
    pis_cofins: Decimal,
    icms: Decimal,
    admin_fee: Decimal,
}

impl ResaleTaxRate {
    pub fn new(pis_cofins: Decimal, icms: Decimal, admin_fee: Decimal) -> Result<Self> {
        validate_rate("Resale PIS/COFINS rate", pis_cofins)?;
        validate_rate("Resale ICMS rate", icms)?;
        validate_rate("Resale administrative fee", admin_fee)?;

        let total = pis_cofins + icms + admin_fee;
        if total >= Decimal::ONE {
            return Err(AppError::configuration(format!(
                "Combined resale tax rate must be below 1.0, got {}",
                total
            )));
        }

        Ok(Self {
            pis_cofins,
            icms,
            admin_fee,
        })
    }

    pub fn pis_cofins(&self) -> Decimal {
        self.pis_cofins
    }

    pub fn icms(&self) -> Decimal {
        self.icms
    }

    pub fn admin_fee(&self) -> Decimal {
        self.admin_fee
    }

    pub fn total(&self) -> Decimal {
        self.pis_cofins + self.icms + self.admin_fee
    }

    /// `1 − total`, always positive
    pub fn complement(&self) -> Decimal {
        Decimal::ONE - self.total()
    }
}

/// Grosses a net cost up into the price that recovers it after resale taxes
pub struct ReversePriceDeriver;

impl ReversePriceDeriver {
    /// `base / (1 − rate)`, rounded half-up to cents.
    ///
    /// Multiplying by `1 + rate` instead would undercharge by the tax on the
    /// tax itself.
    pub fn resale_price(post_credit_base: Decimal, rate: &ResaleTaxRate) -> Decimal {
        round_brl(post_credit_base / rate.complement())
    }

    /// Price for one unit of a line, rounded half-up to cents
    pub fn unit_price(line_resale_price: Decimal, quantity: u32) -> Decimal {
        if quantity == 0 {
            return Decimal::ZERO;
        }
        round_brl(line_resale_price / Decimal::from(quantity))
    }
}
