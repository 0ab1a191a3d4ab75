use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// Most decimal places a configured rate may carry (e.g. 0.0165)
const MAX_RATE_DECIMAL_PLACES: u32 = 6;

/// Import tax rates attached to an NCM classification code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NcmTaxProfile {
    /// Normalized 8-digit NCM code, or "default" for the fallback profile
    pub ncm: String,
    /// Import duty (II)
    pub ii_rate: Decimal,
    /// Industrialized product tax (IPI)
    pub ipi_rate: Decimal,
    /// PIS contribution on import
    pub pis_rate: Decimal,
    /// COFINS contribution on import
    pub cofins_rate: Decimal,
}

impl NcmTaxProfile {
    pub const DEFAULT_CODE: &'static str = "default";

    pub fn new(
        ncm: &str,
        ii_rate: Decimal,
        ipi_rate: Decimal,
        pis_rate: Decimal,
        cofins_rate: Decimal,
    ) -> Result<Self> {
        let profile = Self {
            ncm: normalize_ncm(ncm),
            ii_rate,
            ipi_rate,
            pis_rate,
            cofins_rate,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Fallback profile used when a product has no resolvable classification
    pub fn fallback(
        ii_rate: Decimal,
        ipi_rate: Decimal,
        pis_rate: Decimal,
        cofins_rate: Decimal,
    ) -> Result<Self> {
        let profile = Self {
            ncm: Self::DEFAULT_CODE.to_string(),
            ii_rate,
            ipi_rate,
            pis_rate,
            cofins_rate,
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<()> {
        validate_rate(&format!("NCM {} II rate", self.ncm), self.ii_rate)?;
        validate_rate(&format!("NCM {} IPI rate", self.ncm), self.ipi_rate)?;
        validate_rate(&format!("NCM {} PIS rate", self.ncm), self.pis_rate)?;
        validate_rate(&format!("NCM {} COFINS rate", self.ncm), self.cofins_rate)?;
        Ok(())
    }

    /// Two profiles with identical rates produce identical taxes
    pub fn same_rates(&self, other: &NcmTaxProfile) -> bool {
        self.ii_rate == other.ii_rate
            && self.ipi_rate == other.ipi_rate
            && self.pis_rate == other.pis_rate
            && self.cofins_rate == other.cofins_rate
    }
}

/// Where a line item's tax profile came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileSource {
    /// Resolved from the NCM rate lookup
    Lookup,
    /// Classification missing or not found; configured defaults applied
    Default,
}

/// Tax profile chosen for one product, with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTaxProfile {
    pub profile: NcmTaxProfile,
    pub source: ProfileSource,
}

impl ResolvedTaxProfile {
    pub fn lookup(profile: NcmTaxProfile) -> Self {
        Self {
            profile,
            source: ProfileSource::Lookup,
        }
    }

    pub fn defaulted(profile: NcmTaxProfile) -> Self {
        Self {
            profile,
            source: ProfileSource::Default,
        }
    }
}

/// Strips the dots customs forms print NCM codes with ("8471.30.12")
pub fn normalize_ncm(code: &str) -> String {
    code.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Validate a rate is within 0-1.0 with a bounded number of decimal places
pub fn validate_rate(label: &str, rate: Decimal) -> Result<()> {
    if rate < Decimal::ZERO {
        return Err(AppError::configuration(format!(
            "{} cannot be negative, got {}",
            label, rate
        )));
    }

    if rate > Decimal::ONE {
        return Err(AppError::configuration(format!(
            "{} cannot exceed 1.0 (100%), got {}",
            label, rate
        )));
    }

    if rate.normalize().scale() > MAX_RATE_DECIMAL_PLACES {
        return Err(AppError::configuration(format!(
            "{} cannot have more than {} decimal places, got {}",
            label, MAX_RATE_DECIMAL_PLACES, rate
        )));
    }

    Ok(())
}
