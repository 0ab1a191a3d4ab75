use crate::config::{decimal_or, parse_or};
use crate::core::{AppError, Result};
use crate::modules::pricing::models::{AllocationKey, AllocationPolicy};
use crate::modules::pricing::services::{EngineSettings, ResaleTaxRate};
use crate::modules::taxes::models::ncm_profile::validate_rate;
use crate::modules::taxes::models::{CreditException, CreditPolicy, NcmTaxProfile, TaxRuleSet};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Which tax regime builds the cascade when no rules file overrides it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxRegime {
    Ncm,
    Fixed,
}

impl std::str::FromStr for TaxRegime {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ncm" => Ok(TaxRegime::Ncm),
            "fixed" => Ok(TaxRegime::Fixed),
            _ => Err(format!("Invalid tax regime: {}", s)),
        }
    }
}

/// YAML document replacing the configured rule set and credit exceptions
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaxRulesFile {
    #[serde(default)]
    pub rule_set: Option<TaxRuleSet>,
    #[serde(default)]
    pub credit_exceptions: Option<Vec<CreditException>>,
}

impl TaxRulesFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }
}

#[derive(Debug, Clone)]
pub struct PricingConfig {
    pub regime: TaxRegime,
    pub icms_import_rate: Decimal,
    pub insurance_rate: Decimal,

    pub default_ii_rate: Decimal,
    pub default_ipi_rate: Decimal,
    pub default_pis_rate: Decimal,
    pub default_cofins_rate: Decimal,

    pub fixed_iof_rate: Decimal,
    pub fixed_ipi_rate: Decimal,
    pub fixed_pis_rate: Decimal,
    pub fixed_cofins_rate: Decimal,
    pub fixed_icms_rate: Decimal,

    pub resale_pis_cofins_rate: Decimal,
    pub resale_icms_rate: Decimal,
    pub resale_admin_fee_rate: Decimal,

    pub allocation: AllocationPolicy,

    pub tax_rules_file: Option<PathBuf>,
    pub tax_rules: Option<TaxRulesFile>,
}

impl PricingConfig {
    pub fn from_source(source: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let tax_rules_file = source("TAX_RULES_FILE")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        let tax_rules = match &tax_rules_file {
            Some(path) => {
                info!("Loading tax rules from {}", path.display());
                Some(TaxRulesFile::load(path)?)
            }
            None => None,
        };

        Ok(PricingConfig {
            regime: parse_or(source, "TAX_REGIME", TaxRegime::Ncm)?,
            icms_import_rate: decimal_or(source, "ICMS_IMPORT_RATE", "0.04")?,
            insurance_rate: decimal_or(source, "INSURANCE_RATE", "0.005")?,

            default_ii_rate: decimal_or(source, "DEFAULT_II_RATE", "0.10")?,
            default_ipi_rate: decimal_or(source, "DEFAULT_IPI_RATE", "0.15")?,
            default_pis_rate: decimal_or(source, "DEFAULT_PIS_RATE", "0.0165")?,
            default_cofins_rate: decimal_or(source, "DEFAULT_COFINS_RATE", "0.076")?,

            fixed_iof_rate: decimal_or(source, "FIXED_IOF_RATE", "0.0038")?,
            fixed_ipi_rate: decimal_or(source, "FIXED_IPI_RATE", "0.15")?,
            fixed_pis_rate: decimal_or(source, "FIXED_PIS_RATE", "0.021")?,
            fixed_cofins_rate: decimal_or(source, "FIXED_COFINS_RATE", "0.0965")?,
            fixed_icms_rate: decimal_or(source, "FIXED_ICMS_RATE", "0.04")?,

            resale_pis_cofins_rate: decimal_or(source, "RESALE_PIS_COFINS_RATE", "0.0925")?,
            resale_icms_rate: decimal_or(source, "RESALE_ICMS_RATE", "0.04")?,
            resale_admin_fee_rate: decimal_or(source, "RESALE_ADMIN_FEE_RATE", "0.05")?,

            allocation: AllocationPolicy {
                cost_key: parse_or(source, "ALLOCATION_KEY", AllocationKey::Value)?,
                expenses_key: parse_or(source, "EXPENSES_ALLOCATION_KEY", AllocationKey::Value)?,
            },

            tax_rules_file,
            tax_rules,
        })
    }

    pub fn rule_set(&self) -> TaxRuleSet {
        if let Some(rule_set) = self.tax_rules.as_ref().and_then(|r| r.rule_set.clone()) {
            return rule_set;
        }

        match self.regime {
            TaxRegime::Ncm => TaxRuleSet::NcmDriven {
                icms_rate: self.icms_import_rate,
            },
            TaxRegime::Fixed => TaxRuleSet::FixedRates {
                iof_rate: self.fixed_iof_rate,
                ipi_rate: self.fixed_ipi_rate,
                pis_rate: self.fixed_pis_rate,
                cofins_rate: self.fixed_cofins_rate,
                icms_rate: self.fixed_icms_rate,
            },
        }
    }

    pub fn credit_policy(&self) -> CreditPolicy {
        let exceptions = self
            .tax_rules
            .as_ref()
            .and_then(|r| r.credit_exceptions.clone())
            .unwrap_or_default();

        exceptions
            .into_iter()
            .fold(CreditPolicy::default(), |policy, e| policy.with_exception(e))
    }

    pub fn default_profile(&self) -> Result<NcmTaxProfile> {
        NcmTaxProfile::fallback(
            self.default_ii_rate,
            self.default_ipi_rate,
            self.default_pis_rate,
            self.default_cofins_rate,
        )
    }

    pub fn resale_tax_rate(&self) -> Result<ResaleTaxRate> {
        ResaleTaxRate::new(
            self.resale_pis_cofins_rate,
            self.resale_icms_rate,
            self.resale_admin_fee_rate,
        )
    }

    pub fn validate(&self) -> Result<()> {
        validate_rate("INSURANCE_RATE", self.insurance_rate)?;
        validate_rate("ICMS_IMPORT_RATE", self.icms_import_rate)?;
        if self.icms_import_rate >= Decimal::ONE {
            return Err(AppError::configuration(
                "ICMS_IMPORT_RATE must be below 1.0",
            ));
        }

        let default_profile = self.default_profile()?;
        self.rule_set().validate(&default_profile)?;
        self.credit_policy().validate()?;
        self.resale_tax_rate()?;
        Ok(())
    }

    pub fn engine_settings(&self) -> Result<EngineSettings> {
        Ok(EngineSettings {
            rule_set: self.rule_set(),
            default_profile: self.default_profile()?,
            credit_policy: self.credit_policy(),
            resale_tax_rate: self.resale_tax_rate()?,
            insurance_rate: self.insurance_rate,
            allocation: self.allocation,
        })
    }
}
