use crate::core::{AppError, Result};
use crate::modules::pricing::services::EngineSettings;
use crate::modules::quotations::services::QuotationSettings;
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

pub mod pricing;
pub mod quotation;

pub use pricing::{PricingConfig, TaxRegime, TaxRulesFile};
pub use quotation::QuotationConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub pricing: PricingConfig,
    pub quotation: QuotationConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_source(&|key: &str| env::var(key).ok())
    }

    /// Load configuration from any key/value source
    pub fn from_source(source: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Config {
            app: AppConfig {
                env: source("APP_ENV").unwrap_or_else(|| "development".to_string()),
                log_level: source("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            },
            pricing: PricingConfig::from_source(source)?,
            quotation: QuotationConfig::from_source(source)?,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.pricing.validate()?;
        self.quotation.validate()?;
        Ok(())
    }

    /// Settings the import cost engine is built from
    pub fn engine_settings(&self) -> Result<EngineSettings> {
        self.pricing.engine_settings()
    }

    pub fn quotation_settings(&self) -> QuotationSettings {
        self.quotation.settings()
    }
}

/// Parse `key` from `source`, or use `default` when it is unset
pub(crate) fn parse_or<T: FromStr>(
    source: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    match source(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::configuration(format!("Invalid {}: {}", key, raw))),
        None => Ok(default),
    }
}

/// Decimal variant of [`parse_or`] taking the default as text
pub(crate) fn decimal_or(
    source: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<Decimal> {
    let default = Decimal::from_str(default)
        .map_err(|_| AppError::internal(format!("Bad built-in default for {}", key)))?;
    parse_or(source, key, default)
}
