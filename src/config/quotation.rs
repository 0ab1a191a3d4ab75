use crate::config::{decimal_or, parse_or};
use crate::core::{AppError, Result};
use crate::modules::quotations::services::QuotationSettings;
use chrono::Duration;
use rust_decimal::Decimal;

/// Quotation cache windows and the default pair used during outages
#[derive(Debug, Clone)]
pub struct QuotationConfig {
    pub ttl_hours: i64,
    pub fallback_ttl_minutes: i64,
    pub fallback_origin_to_brl: Decimal,
    pub fallback_usd_to_brl: Decimal,
}

impl QuotationConfig {
    pub fn from_source(source: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(QuotationConfig {
            ttl_hours: parse_or(source, "QUOTATION_TTL_HOURS", 24)?,
            fallback_ttl_minutes: parse_or(source, "QUOTATION_FALLBACK_TTL_MINUTES", 30)?,
            fallback_origin_to_brl: decimal_or(source, "FALLBACK_ORIGIN_TO_BRL", "0.70")?,
            fallback_usd_to_brl: decimal_or(source, "FALLBACK_USD_TO_BRL", "5.20")?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.ttl_hours <= 0 {
            return Err(AppError::configuration(
                "QUOTATION_TTL_HOURS must be greater than 0",
            ));
        }

        if self.fallback_ttl_minutes <= 0 {
            return Err(AppError::configuration(
                "QUOTATION_FALLBACK_TTL_MINUTES must be greater than 0",
            ));
        }

        if self.fallback_origin_to_brl <= Decimal::ZERO || self.fallback_usd_to_brl <= Decimal::ZERO {
            return Err(AppError::configuration(
                "Fallback exchange rates must be greater than 0",
            ));
        }

        Ok(())
    }

    pub fn settings(&self) -> QuotationSettings {
        QuotationSettings {
            ttl: Duration::hours(self.ttl_hours),
            fallback_ttl: Duration::minutes(self.fallback_ttl_minutes),
            fallback_origin_to_brl: self.fallback_origin_to_brl,
            fallback_usd_to_brl: self.fallback_usd_to_brl,
        }
    }
}
