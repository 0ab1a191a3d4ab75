use std::sync::Arc;

use chrono::Duration;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::core::{Currency, TtlCache};
use crate::modules::quotations::models::{ExchangeQuotation, QuotationSource};
use crate::modules::quotations::repositories::QuotationProvider;

/// Freshness windows and documented default rates
#[derive(Debug, Clone)]
pub struct QuotationSettings {
    pub ttl: Duration,
    pub fallback_ttl: Duration,
    pub fallback_origin_to_brl: Decimal,
    pub fallback_usd_to_brl: Decimal,
}

impl Default for QuotationSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::hours(24),
            fallback_ttl: Duration::minutes(30),
            fallback_origin_to_brl: Decimal::new(70, 2),
            fallback_usd_to_brl: Decimal::new(520, 2),
        }
    }
}

/// Resolves the quotation a calculation runs with. Never fails: a provider
/// outage degrades to the last known value, then to the documented defaults.
pub struct QuotationService {
    provider: Arc<dyn QuotationProvider>,
    cache: Arc<TtlCache<Currency, ExchangeQuotation>>,
    settings: QuotationSettings,
}

impl QuotationService {
    pub fn new(
        provider: Arc<dyn QuotationProvider>,
        cache: Arc<TtlCache<Currency, ExchangeQuotation>>,
        settings: QuotationSettings,
    ) -> Self {
        Self {
            provider,
            cache,
            settings,
        }
    }

    pub async fn resolve(&self, origin: Currency) -> ExchangeQuotation {
        if let Some(cached) = self.cache.get(&origin).await {
            // A cached fallback keeps its flag until a live rate replaces it
            return if cached.is_fallback() {
                cached
            } else {
                cached.with_source(QuotationSource::Cached)
            };
        }

        let fetched = self
            .provider
            .fetch_quotation(origin)
            .await
            .and_then(|q| q.validate().map(|_| q));

        match fetched {
            Ok(quotation) => {
                let quotation = quotation.with_source(QuotationSource::Live);
                info!(
                    "Fetched {}→BRL quotation {} from {} (USD→BRL {})",
                    origin,
                    quotation.origin_to_brl,
                    self.provider.name(),
                    quotation.usd_to_brl
                );
                self.cache
                    .insert(origin, quotation.clone(), self.settings.ttl)
                    .await;
                quotation
            }
            Err(e) => {
                warn!(
                    "Quotation provider {} failed for {}: {}",
                    self.provider.name(),
                    origin,
                    e
                );
                self.last_known_or_default(origin).await
            }
        }
    }

    async fn last_known_or_default(&self, origin: Currency) -> ExchangeQuotation {
        if let Some(entry) = self.cache.get_stale(&origin).await {
            if !entry.value.is_fallback() {
                warn!(
                    "Using stale {}→BRL quotation from {}",
                    origin, entry.value.quoted_at
                );
                return entry.value.with_source(QuotationSource::Stale);
            }
        }

        let fallback = ExchangeQuotation::fallback(
            origin,
            self.settings.fallback_origin_to_brl,
            self.settings.fallback_usd_to_brl,
        );
        warn!(
            "No {}→BRL quotation known; using default rates {} / USD {}",
            origin, fallback.origin_to_brl, fallback.usd_to_brl
        );
        self.cache
            .insert(origin, fallback.clone(), self.settings.fallback_ttl)
            .await;
        fallback
    }
}
