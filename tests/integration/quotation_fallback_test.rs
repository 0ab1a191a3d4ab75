//! Integration tests for quotation resolution
//!
//! Covers the cache → live → last known → default chain and the freshness
//! windows of cached and substituted quotations.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use importcost::core::{Currency, TtlCache};
use importcost::quotations::{
    ExchangeQuotation, QuotationProvider, QuotationService, QuotationSettings, QuotationSource,
};
use importcost::{AppError, Result};
use rust_decimal_macros::dec;

/// Provider that counts calls and can be switched off
struct CountingProvider {
    calls: AtomicUsize,
    available: bool,
}

impl CountingProvider {
    fn new(available: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            available,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuotationProvider for CountingProvider {
    async fn fetch_quotation(&self, origin: Currency) -> Result<ExchangeQuotation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.available {
            return Err(AppError::provider("exchange feed timed out"));
        }
        ExchangeQuotation::new(origin, dec!(0.76), dec!(5.41), Utc::now())
    }

    fn name(&self) -> &str {
        "counting"
    }
}

fn service(
    provider: Arc<CountingProvider>,
    cache: Arc<TtlCache<Currency, ExchangeQuotation>>,
) -> QuotationService {
    QuotationService::new(provider, cache, QuotationSettings::default())
}

#[tokio::test]
async fn test_fresh_quotation_is_served_from_cache() {
    let provider = Arc::new(CountingProvider::new(true));
    let quotations = service(provider.clone(), Arc::new(TtlCache::new()));

    let first = quotations.resolve(Currency::CNY).await;
    let second = quotations.resolve(Currency::CNY).await;

    assert_eq!(first.source, QuotationSource::Live);
    assert_eq!(second.source, QuotationSource::Cached);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_currencies_are_cached_separately() {
    let provider = Arc::new(CountingProvider::new(true));
    let quotations = service(provider.clone(), Arc::new(TtlCache::new()));

    quotations.resolve(Currency::CNY).await;
    let usd = quotations.resolve(Currency::USD).await;

    assert_eq!(usd.origin_currency, Currency::USD);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_expired_quotation_is_refetched() {
    let provider = Arc::new(CountingProvider::new(true));
    let cache = Arc::new(TtlCache::new());
    let old = ExchangeQuotation::new(Currency::CNY, dec!(0.60), dec!(5.00), Utc::now() - Duration::days(2))
        .unwrap();
    cache.insert(Currency::CNY, old, Duration::zero()).await;

    let quotation = service(provider.clone(), cache).resolve(Currency::CNY).await;

    assert_eq!(quotation.source, QuotationSource::Live);
    assert_eq!(quotation.origin_to_brl, dec!(0.76));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_outage_serves_last_known_value() {
    let cache = Arc::new(TtlCache::new());
    let old = ExchangeQuotation::new(Currency::CNY, dec!(0.72), dec!(5.10), Utc::now() - Duration::days(2))
        .unwrap();
    cache.insert(Currency::CNY, old, Duration::zero()).await;

    let quotation = service(Arc::new(CountingProvider::new(false)), cache)
        .resolve(Currency::CNY)
        .await;

    assert!(quotation.is_stale());
    assert!(!quotation.is_fallback());
    assert_eq!(quotation.origin_to_brl, dec!(0.72));
}

#[tokio::test]
async fn test_outage_without_history_substitutes_defaults() {
    let provider = Arc::new(CountingProvider::new(false));
    let cache = Arc::new(TtlCache::new());
    let quotations = service(provider.clone(), cache.clone());

    let quotation = quotations.resolve(Currency::CNY).await;

    assert!(quotation.is_fallback());
    assert_eq!(quotation.origin_to_brl, dec!(0.70));
    assert_eq!(quotation.usd_to_brl, dec!(5.20));

    // The substitute is cached for its short window and keeps its flag
    let again = quotations.resolve(Currency::CNY).await;
    assert!(again.is_fallback());
    assert_eq!(provider.calls(), 1);

    let entry = cache.get_stale(&Currency::CNY).await.unwrap();
    assert!(entry.expires_at - entry.cached_at <= Duration::minutes(30));
}

#[tokio::test]
async fn test_configured_fallback_rates() {
    let settings = QuotationSettings {
        fallback_origin_to_brl: dec!(0.68),
        fallback_usd_to_brl: dec!(4.95),
        ..Default::default()
    };
    let quotations = QuotationService::new(
        Arc::new(CountingProvider::new(false)),
        Arc::new(TtlCache::new()),
        settings,
    );

    let quotation = quotations.resolve(Currency::CNY).await;
    assert_eq!(quotation.origin_to_brl, dec!(0.68));
    assert_eq!(quotation.usd_to_brl, dec!(4.95));
}
