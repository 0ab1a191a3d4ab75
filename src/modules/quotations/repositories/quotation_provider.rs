use async_trait::async_trait;

use crate::core::{AppError, Currency, Result};
use crate::modules::quotations::models::ExchangeQuotation;

/// Exchange rate source (bank feed, market data API...)
#[async_trait]
pub trait QuotationProvider: Send + Sync {
    async fn fetch_quotation(&self, origin: Currency) -> Result<ExchangeQuotation>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Provider answering with a fixed quotation, or failing when it has none
#[derive(Debug, Clone, Default)]
pub struct StaticQuotationProvider {
    quotation: Option<ExchangeQuotation>,
}

impl StaticQuotationProvider {
    pub fn new(quotation: ExchangeQuotation) -> Self {
        Self {
            quotation: Some(quotation),
        }
    }

    /// A provider whose every fetch fails
    pub fn unavailable() -> Self {
        Self { quotation: None }
    }
}

#[async_trait]
impl QuotationProvider for StaticQuotationProvider {
    async fn fetch_quotation(&self, origin: Currency) -> Result<ExchangeQuotation> {
        match &self.quotation {
            Some(quotation) if quotation.origin_currency == origin => Ok(quotation.clone()),
            Some(quotation) => Err(AppError::provider(format!(
                "static provider only quotes {}, asked for {}",
                quotation.origin_currency, origin
            ))),
            None => Err(AppError::provider("quotation provider unavailable")),
        }
    }

    fn name(&self) -> &str {
        "static"
    }
}
