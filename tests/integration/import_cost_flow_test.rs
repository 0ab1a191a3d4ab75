//! Integration tests for the full quote flow
//!
//! Runs `ImportCostService::quote` against in-memory collaborators: NCM rate
//! table, quotation provider and cache, bracket table and freight provider.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use importcost::core::{Currency, TtlCache};
use importcost::freight::{FixedFreightCostProvider, FreightBracket, InMemoryBracketRepository};
use importcost::pricing::{
    AllocationKey, AllocationPolicy, EngineSettings, ImportCostEngine, ImportCostService,
    LineItem, QuoteRequest, ResaleTaxRate,
};
use importcost::quotations::{
    ExchangeQuotation, QuotationService, QuotationSettings, StaticQuotationProvider,
};
use importcost::taxes::{
    CreditPolicy, InMemoryNcmRateRepository, NcmRateRepository, NcmTaxProfile, ProfileSource,
    TaxKind, TaxRuleSet,
};
use importcost::{AppError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

struct BrokenNcmRepository;

#[async_trait]
impl NcmRateRepository for BrokenNcmRepository {
    async fn find_by_ncm(&self, _ncm: &str) -> Result<Option<NcmTaxProfile>> {
        Err(AppError::provider("rate table offline"))
    }
}

fn settings(rule_set: TaxRuleSet) -> EngineSettings {
    EngineSettings {
        rule_set,
        default_profile: NcmTaxProfile::fallback(dec!(0.10), dec!(0.15), dec!(0.0165), dec!(0.076))
            .unwrap(),
        credit_policy: CreditPolicy::default(),
        resale_tax_rate: ResaleTaxRate::new(dec!(0.0925), dec!(0.04), dec!(0.05)).unwrap(),
        insurance_rate: dec!(0.005),
        allocation: AllocationPolicy::default(),
    }
}

fn ncm_table() -> InMemoryNcmRateRepository {
    InMemoryNcmRateRepository::new(vec![
        NcmTaxProfile::new("8471.30.12", dec!(0.10), dec!(0.15), dec!(0.0165), dec!(0.076)).unwrap(),
        NcmTaxProfile::new("8517.13.00", dec!(0.16), dec!(0.15), dec!(0.021), dec!(0.0965)).unwrap(),
    ])
    .unwrap()
}

fn brackets() -> Vec<FreightBracket> {
    let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    vec![
        FreightBracket::new("lcl-1", dec!(0), dec!(1), dec!(150), created).unwrap(),
        FreightBracket::new("lcl-5", dec!(1), dec!(5), dec!(600), created + Duration::days(1))
            .unwrap()
            .as_default(),
    ]
}

fn live_quotation() -> ExchangeQuotation {
    ExchangeQuotation::new(Currency::CNY, dec!(0.50), dec!(5.30), Utc::now()).unwrap()
}

struct Harness {
    rule_set: TaxRuleSet,
    ncm_repo: Arc<dyn NcmRateRepository>,
    provider: StaticQuotationProvider,
    brackets: Vec<FreightBracket>,
    freight: FixedFreightCostProvider,
}

impl Default for Harness {
    fn default() -> Self {
        Self {
            rule_set: TaxRuleSet::NcmDriven { icms_rate: dec!(0.04) },
            ncm_repo: Arc::new(ncm_table()),
            provider: StaticQuotationProvider::new(live_quotation()),
            brackets: brackets(),
            freight: FixedFreightCostProvider::flat(dec!(200)),
        }
    }
}

impl Harness {
    fn service(self) -> ImportCostService {
        let quotations = QuotationService::new(
            Arc::new(self.provider),
            Arc::new(TtlCache::new()),
            QuotationSettings::default(),
        );

        ImportCostService::new(
            Arc::new(ImportCostEngine::new(settings(self.rule_set)).unwrap()),
            self.ncm_repo,
            Arc::new(quotations),
            Arc::new(InMemoryBracketRepository::new(self.brackets).unwrap()),
            Arc::new(self.freight),
        )
    }
}

/// 10 notebooks at CNY 200, quoted at 0.50 → FOB 1000 BRL
fn notebook_cart() -> QuoteRequest {
    let item = LineItem::new("notebook", dec!(200), 10, dec!(0.05), dec!(2.5))
        .unwrap()
        .with_ncm("8471.30.12");
    QuoteRequest::new(vec![item])
}

#[tokio::test]
async fn test_single_profile_quote() {
    let record = Harness::default().service().quote(notebook_cart()).await.unwrap();
    let b = &record.breakdown;

    assert_eq!(b.fob, dec!(1000));
    assert_eq!(b.freight, dec!(200));
    assert_eq!(b.insurance, dec!(6));
    assert_eq!(b.cif, dec!(1206));

    assert_eq!(b.taxes.ii, dec!(120.60));
    assert_eq!(b.taxes.ipi, dec!(198.99));
    assert_eq!(b.taxes.pis, dec!(19.90));
    assert_eq!(b.taxes.cofins, dec!(91.66));
    assert_eq!(b.taxes.icms, dec!(68.21));
    assert_eq!(b.total_taxes, dec!(499.36));

    assert_eq!(b.bracket_id, "lcl-1");
    assert_eq!(b.brazil_expenses, dec!(150));
    assert_eq!(b.imported_cost, dec!(1855.36));
    assert_eq!(b.creditable_taxes, dec!(378.76));
    assert_eq!(b.post_credit_base, dec!(1476.60));
    assert_eq!(b.resale_price, dec!(1806.24));

    assert!(!b.flags.is_fallback_derived());
    assert!(!b.flags.bracket_fallback);
    assert!(b.flags.insurance_defaulted);
    assert_eq!(record.items[0].profile_source, ProfileSource::Lookup);
    assert_eq!(record.items[0].ncm, "84713012");
}

#[tokio::test]
async fn test_supplied_insurance_is_used_as_is() {
    let mut request = notebook_cart();
    request.insurance = Some(dec!(10));

    let record = Harness::default().service().quote(request).await.unwrap();

    assert_eq!(record.breakdown.cif, dec!(1210));
    assert!(!record.breakdown.flags.insurance_defaulted);
}

#[tokio::test]
async fn test_unknown_ncm_uses_default_profile() {
    let item = LineItem::new("gadget", dec!(100), 2, dec!(0.01), dec!(0.3))
        .unwrap()
        .with_ncm("9999.99.99");

    let record = Harness::default()
        .service()
        .quote(QuoteRequest::new(vec![item]))
        .await
        .unwrap();

    let flags = &record.breakdown.flags;
    assert!(flags.default_tax_profile);
    assert_eq!(flags.defaulted_products, vec!["gadget".to_string()]);
    assert_eq!(record.items[0].profile_source, ProfileSource::Default);
    assert_eq!(record.items[0].ncm, NcmTaxProfile::DEFAULT_CODE);
}

#[tokio::test]
async fn test_rate_table_outage_uses_default_profile() {
    let harness = Harness {
        ncm_repo: Arc::new(BrokenNcmRepository),
        ..Default::default()
    };

    let record = harness.service().quote(notebook_cart()).await.unwrap();

    assert!(record.breakdown.flags.default_tax_profile);
    // Default rates equal the notebook's, so the numbers do not move
    assert_eq!(record.breakdown.total_taxes, dec!(499.36));
}

#[tokio::test]
async fn test_quotation_outage_uses_fallback_rates() {
    let harness = Harness {
        provider: StaticQuotationProvider::unavailable(),
        ..Default::default()
    };

    let record = harness.service().quote(notebook_cart()).await.unwrap();
    let b = &record.breakdown;

    assert!(b.flags.fallback_quotation);
    assert_eq!(b.quotation.origin_to_brl, dec!(0.70));
    // 10 × 200 × 0.70
    assert_eq!(b.fob, dec!(1400));
}

#[tokio::test]
async fn test_empty_bracket_table_aborts_quote() {
    let harness = Harness {
        brackets: Vec::new(),
        ..Default::default()
    };

    let result = harness.service().quote(notebook_cart()).await;
    assert!(matches!(result, Err(AppError::NoApplicableBracket(_))));
}

#[tokio::test]
async fn test_out_of_range_volume_uses_default_bracket() {
    let item = LineItem::new("pallet", dec!(1000), 1, dec!(12), dec!(400))
        .unwrap()
        .with_ncm("8471.30.12");

    let record = Harness::default()
        .service()
        .quote(QuoteRequest::new(vec![item]))
        .await
        .unwrap();

    assert_eq!(record.breakdown.bracket_id, "lcl-5");
    assert!(record.breakdown.flags.bracket_fallback);
}

#[tokio::test]
async fn test_freight_provider_failure_aborts_quote() {
    let harness = Harness {
        freight: FixedFreightCostProvider::new().with_bracket_cost("lcl-5", dec!(900)),
        ..Default::default()
    };

    let result = harness.service().quote(notebook_cart()).await;
    assert!(matches!(result, Err(AppError::Provider(_))));
}

#[tokio::test]
async fn test_empty_cart_is_rejected() {
    let result = Harness::default()
        .service()
        .quote(QuoteRequest::new(Vec::new()))
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn test_resale_rate_of_one_cannot_configure_engine() {
    assert!(matches!(
        ResaleTaxRate::new(dec!(0.80), dec!(0.15), dec!(0.05)),
        Err(AppError::Configuration(_))
    ));
}

#[test]
fn test_gross_up_rate_of_one_cannot_build_engine() {
    let result = ImportCostEngine::new(settings(TaxRuleSet::NcmDriven { icms_rate: dec!(1) }));
    assert!(matches!(result, Err(AppError::Configuration(_))));
}

#[tokio::test]
async fn test_fixed_regime_charges_iof_and_no_duty() {
    let harness = Harness {
        rule_set: TaxRuleSet::FixedRates {
            iof_rate: dec!(0.0038),
            ipi_rate: dec!(0.15),
            pis_rate: dec!(0.021),
            cofins_rate: dec!(0.0965),
            icms_rate: dec!(0.04),
        },
        ..Default::default()
    };

    let record = harness.service().quote(notebook_cart()).await.unwrap();
    let b = &record.breakdown;

    assert_eq!(b.regime, "fixed_rates");
    assert_eq!(b.taxes.ii, Decimal::ZERO);
    // CIF 1206
    assert_eq!(b.taxes.iof, dec!(4.58));
    assert_eq!(b.taxes.ipi, dec!(180.90));
    assert_eq!(b.credits.get(TaxKind::Iof), Decimal::ZERO);
}

#[tokio::test]
async fn test_mixed_cart_allocations_add_up() {
    let notebook = LineItem::new("notebook", dec!(200), 3, dec!(0.05), dec!(2.5))
        .unwrap()
        .with_ncm("8471.30.12");
    let phone = LineItem::new("phone", dec!(150), 7, dec!(0.002), dec!(0.4))
        .unwrap()
        .with_ncm("8517.13.00");
    let cable = LineItem::new("cable", dec!(3.33), 17, dec!(0.0005), dec!(0.05))
        .unwrap()
        .with_variation("usb-c 1m");

    let mut request = QuoteRequest::new(vec![notebook, phone, cable]);
    request.national_freight = Some(dec!(85.50));

    let record = Harness::default().service().quote(request).await.unwrap();
    let b = &record.breakdown;

    let sum = |f: fn(&importcost::pricing::AllocatedItemCost) -> Decimal| -> Decimal {
        record.items.iter().map(f).sum()
    };

    assert_eq!(sum(|i| i.fob), b.fob);
    assert_eq!(sum(|i| i.freight), b.freight);
    assert_eq!(sum(|i| i.insurance), b.insurance);
    assert_eq!(sum(|i| i.cif), b.cif);
    assert_eq!(sum(|i| i.total_taxes), b.total_taxes);
    assert_eq!(sum(|i| i.brazil_expenses), b.brazil_expenses);
    assert_eq!(sum(|i| i.national_freight), dec!(85.50));
    assert_eq!(sum(|i| i.imported_cost), b.imported_cost);
    assert_eq!(sum(|i| i.creditable_taxes), b.creditable_taxes);

    // Per-item resale prices are recomputed, so they only approximate the total
    let resale_drift = (sum(|i| i.resale_price) - b.resale_price).abs();
    assert!(resale_drift <= dec!(0.03));

    assert_eq!(b.flags.defaulted_products, vec!["cable".to_string()]);
    assert_eq!(record.items[2].variation.as_deref(), Some("usb-c 1m"));
    assert!(record.items[1].taxes.ii > Decimal::ZERO);
}

#[tokio::test]
async fn test_weight_allocation_key() {
    let heavy = LineItem::new("heavy", dec!(10), 1, dec!(0.1), dec!(90))
        .unwrap()
        .with_ncm("8471.30.12");
    let light = LineItem::new("light", dec!(990), 1, dec!(0.1), dec!(10))
        .unwrap()
        .with_ncm("8471.30.12");

    let mut engine_settings = settings(TaxRuleSet::NcmDriven { icms_rate: dec!(0.04) });
    engine_settings.allocation = AllocationPolicy {
        cost_key: AllocationKey::Weight,
        expenses_key: AllocationKey::Weight,
    };

    let quotations = QuotationService::new(
        Arc::new(StaticQuotationProvider::new(live_quotation())),
        Arc::new(TtlCache::new()),
        QuotationSettings::default(),
    );
    let service = ImportCostService::new(
        Arc::new(ImportCostEngine::new(engine_settings).unwrap()),
        Arc::new(ncm_table()),
        Arc::new(quotations),
        Arc::new(InMemoryBracketRepository::new(brackets()).unwrap()),
        Arc::new(FixedFreightCostProvider::flat(dec!(200))),
    );

    let record = service.quote(QuoteRequest::new(vec![heavy, light])).await.unwrap();

    assert_eq!(record.items[0].freight, dec!(180));
    assert_eq!(record.items[1].freight, dec!(20));
    assert_eq!(record.items[0].brazil_expenses, dec!(135));
}

#[tokio::test]
async fn test_variation_lines_resolve_their_own_ncm() {
    let notebook = LineItem::new("dock", dec!(200), 2, dec!(0.01), dec!(0.5))
        .unwrap()
        .with_variation("computer dock")
        .with_ncm("8471.30.12");
    let phone = LineItem::new("dock", dec!(200), 2, dec!(0.01), dec!(0.5))
        .unwrap()
        .with_variation("phone dock")
        .with_ncm("8517.13.00");

    let record = Harness::default()
        .service()
        .quote(QuoteRequest::new(vec![notebook, phone]))
        .await
        .unwrap();

    assert_eq!(record.items[0].ncm, "84713012");
    assert_eq!(record.items[1].ncm, "85171300");
    // Same value, same freight; the phone line carries the higher duty
    assert_eq!(record.items[0].cif, record.items[1].cif);
    assert!(record.items[1].taxes.ii > record.items[0].taxes.ii);
    assert!(!record.breakdown.flags.default_tax_profile);
}

#[tokio::test]
async fn test_each_quote_is_a_new_record() {
    let service = Harness::default().service();
    let mut request = notebook_cart();
    request.reference = Some("cart-42".to_string());
    request.national_freight = Some(dec!(40));

    let first = service.quote(request.clone()).await.unwrap();
    let second = service.quote(request.clone()).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(first.reference.as_deref(), Some("cart-42"));
    assert_eq!(first.breakdown.resale_price, second.breakdown.resale_price);
    // Second run is served from the quotation cache
    assert_eq!(
        second.breakdown.quotation.source,
        importcost::quotations::QuotationSource::Cached
    );

    // The record echoes the request it was computed from
    assert_eq!(first.request, request);
    assert_eq!(first.request.line_items[0].ncm.as_deref(), Some("8471.30.12"));
    assert_eq!(first.request.origin_currency, Currency::CNY);
    assert_eq!(first.request.national_freight, Some(dec!(40)));
}
