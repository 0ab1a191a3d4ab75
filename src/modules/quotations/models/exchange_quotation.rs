use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Currency, Result};

/// How the quotation used by a calculation was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotationSource {
    /// Fetched from the provider for this request
    Live,
    /// Served from cache within its freshness window
    Cached,
    /// Provider failed; last known value past its freshness window
    Stale,
    /// Provider failed and nothing was known; documented default rates
    Fallback,
}

/// Origin-currency → BRL bid rate plus the USD → BRL reference rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeQuotation {
    pub origin_currency: Currency,
    pub origin_to_brl: Decimal,
    pub usd_to_brl: Decimal,
    pub quoted_at: DateTime<Utc>,
    pub source: QuotationSource,
}

impl ExchangeQuotation {
    pub fn new(
        origin_currency: Currency,
        origin_to_brl: Decimal,
        usd_to_brl: Decimal,
        quoted_at: DateTime<Utc>,
    ) -> Result<Self> {
        let quotation = Self {
            origin_currency,
            origin_to_brl,
            usd_to_brl,
            quoted_at,
            source: QuotationSource::Live,
        };
        quotation.validate()?;
        Ok(quotation)
    }

    /// Documented default pair used when no quotation can be obtained
    pub fn fallback(origin_currency: Currency, origin_to_brl: Decimal, usd_to_brl: Decimal) -> Self {
        Self {
            origin_currency,
            origin_to_brl,
            usd_to_brl,
            quoted_at: Utc::now(),
            source: QuotationSource::Fallback,
        }
    }

    pub fn with_source(mut self, source: QuotationSource) -> Self {
        self.source = source;
        self
    }

    pub fn is_fallback(&self) -> bool {
        self.source == QuotationSource::Fallback
    }

    pub fn is_stale(&self) -> bool {
        self.source == QuotationSource::Stale
    }

    pub fn validate(&self) -> Result<()> {
        if self.origin_to_brl <= Decimal::ZERO {
            return Err(AppError::validation(format!(
                "{}→BRL rate must be positive, got {}",
                self.origin_currency, self.origin_to_brl
            )));
        }

        if self.usd_to_brl <= Decimal::ZERO {
            return Err(AppError::validation(format!(
                "USD→BRL rate must be positive, got {}",
                self.usd_to_brl
            )));
        }

        Ok(())
    }
}
