// Property-based tests for how the resale price reacts to cost inputs
//
// Freight, insurance and non-creditable duties raise the resale price.
// Fully creditable lines (IPI, PIS, COFINS, ICMS under the default credit
// policy) raise the imported cost but are recovered as credits, so the
// resale price does not move with their rates.

use chrono::Utc;
use importcost::freight::FreightBracket;
use importcost::pricing::{
    AllocationPolicy, CalculationInput, CostBreakdown, EngineSettings, ImportCostEngine,
    LineItem, ResaleTaxRate,
};
use importcost::quotations::ExchangeQuotation;
use importcost::taxes::{CreditPolicy, NcmTaxProfile, ResolvedTaxProfile, TaxRuleSet};
use importcost::Currency;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn engine() -> ImportCostEngine {
    ImportCostEngine::new(EngineSettings {
        rule_set: TaxRuleSet::NcmDriven { icms_rate: dec!(0.04) },
        default_profile: NcmTaxProfile::fallback(dec!(0.10), dec!(0.15), dec!(0.0165), dec!(0.076))
            .unwrap(),
        credit_policy: CreditPolicy::default(),
        resale_tax_rate: ResaleTaxRate::new(dec!(0.0925), dec!(0.04), dec!(0.05)).unwrap(),
        insurance_rate: dec!(0.005),
        allocation: AllocationPolicy::default(),
    })
    .unwrap()
}

/// One line worth `fob` BRL at a 1:1 quotation, inside the first bracket
fn input(fob: Decimal, profile: NcmTaxProfile, freight: Decimal) -> CalculationInput {
    CalculationInput {
        line_items: vec![LineItem::new("sku-1", fob, 1, dec!(0.5), dec!(20)).unwrap()],
        tax_profiles: vec![Some(ResolvedTaxProfile::lookup(profile))],
        quotation: ExchangeQuotation::new(Currency::CNY, dec!(1), dec!(5.20), Utc::now()).unwrap(),
        brackets: vec![FreightBracket::new("lcl-1", dec!(0), dec!(1), dec!(150), Utc::now()).unwrap()],
        freight_cost: freight,
        insurance: None,
        national_freight: None,
    }
}

fn profile(ii: Decimal, ipi: Decimal, cofins: Decimal) -> NcmTaxProfile {
    NcmTaxProfile::new("8471.30.12", ii, ipi, dec!(0.021), cofins).unwrap()
}

fn quote(input: &CalculationInput) -> CostBreakdown {
    engine().compute_import_cost(input).unwrap().breakdown
}

fn basis_points(bp: u32) -> Decimal {
    Decimal::new(bp as i64, 4)
}

#[test]
fn test_ipi_rate_is_recovered_through_credits() {
    let low = quote(&input(dec!(1000), profile(dec!(0.10), dec!(0.05), dec!(0.076)), dec!(200)));
    let high = quote(&input(dec!(1000), profile(dec!(0.10), dec!(0.50), dec!(0.076)), dec!(200)));

    assert!(high.imported_cost > low.imported_cost);
    assert!(high.creditable_taxes > low.creditable_taxes);
    assert_eq!(high.post_credit_base, low.post_credit_base);
    assert_eq!(high.resale_price, low.resale_price);
}

proptest! {
    /// Property: a higher import duty (not creditable) gives a higher resale price
    #[test]
    fn prop_resale_rises_with_ii_rate(
        fob_units in 1_000u32..200_000u32,
        low_bp in 0u32..4_000u32,
        step_bp in 100u32..6_000u32,
    ) {
        let fob = Decimal::from(fob_units);
        let high_bp = (low_bp + step_bp).min(10_000);

        let low = quote(&input(fob, profile(basis_points(low_bp), dec!(0.15), dec!(0.076)), dec!(200)));
        let high = quote(&input(fob, profile(basis_points(high_bp), dec!(0.15), dec!(0.076)), dec!(200)));

        prop_assert!(high.resale_price > low.resale_price,
            "II {} -> {}, II {} -> {}", low_bp, low.resale_price, high_bp, high.resale_price);
    }

    /// Property: more freight gives a higher resale price
    #[test]
    fn prop_resale_rises_with_freight(
        fob_units in 100u32..200_000u32,
        freight_cents in 0u64..10_000_000u64,
        extra_cents in 1u64..1_000_000u64,
    ) {
        let fob = Decimal::from(fob_units);
        let base_profile = profile(dec!(0.10), dec!(0.15), dec!(0.076));

        let low = quote(&input(fob, base_profile.clone(), Decimal::new(freight_cents as i64, 2)));
        let high = quote(&input(
            fob,
            base_profile,
            Decimal::new((freight_cents + extra_cents) as i64, 2),
        ));

        prop_assert!(high.resale_price > low.resale_price);
    }

    /// Property: more supplied insurance gives a higher resale price
    #[test]
    fn prop_resale_rises_with_insurance(
        fob_units in 100u32..200_000u32,
        insurance_cents in 0u64..1_000_000u64,
        extra_cents in 1u64..1_000_000u64,
    ) {
        let fob = Decimal::from(fob_units);
        let mut low_input = input(fob, profile(dec!(0.10), dec!(0.15), dec!(0.076)), dec!(200));
        let mut high_input = low_input.clone();
        low_input.insurance = Some(Decimal::new(insurance_cents as i64, 2));
        high_input.insurance = Some(Decimal::new((insurance_cents + extra_cents) as i64, 2));

        let low = quote(&low_input);
        let high = quote(&high_input);

        prop_assert!(high.resale_price > low.resale_price);
    }

    /// Property: rates of fully creditable lines leave the resale price unchanged
    #[test]
    fn prop_creditable_rates_leave_resale_unchanged(
        fob_units in 1u32..200_000u32,
        ipi_a in 0u32..10_000u32,
        ipi_b in 0u32..10_000u32,
        cofins_a in 0u32..5_000u32,
        cofins_b in 0u32..5_000u32,
    ) {
        let fob = Decimal::from(fob_units);

        let a = quote(&input(fob, profile(dec!(0.10), basis_points(ipi_a), basis_points(cofins_a)), dec!(200)));
        let b = quote(&input(fob, profile(dec!(0.10), basis_points(ipi_b), basis_points(cofins_b)), dec!(200)));

        prop_assert_eq!(a.post_credit_base, b.post_credit_base);
        prop_assert_eq!(a.resale_price, b.resale_price);
        // Base is CIF + duty + expenses once every creditable line is recovered
        prop_assert_eq!(a.post_credit_base, a.cif + a.taxes.ii + a.brazil_expenses);
    }
}
