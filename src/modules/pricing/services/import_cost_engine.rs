// Import cost engine.
//
// Pure and synchronous: every collaborator has been resolved into the
// `CalculationInput` before this runs. The flow is strictly forward:
// bracket selection, customs value, tax cascade per tax group, credits,
// resale gross-up, per-item allocation.

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::core::{bounded_brl, checked_sum, AppError, Currency, Result};
use crate::modules::freight::services::BracketSelector;
use crate::modules::pricing::models::{
    AllocationPolicy, CalculationFlags, CalculationInput, CostBreakdown, ImportCostResult,
    LineItem,
};
use crate::modules::pricing::services::cif_assembler::CifAssembler;
use crate::modules::pricing::services::cost_allocator::{CostAllocator, ItemShares};
use crate::modules::pricing::services::resale_price::{ResaleTaxRate, ReversePriceDeriver};
use crate::modules::taxes::models::ncm_profile::validate_rate;
use crate::modules::taxes::models::{
    CreditPolicy, NcmTaxProfile, ProfileSource, ResolvedTaxProfile, TaxAmounts, TaxRuleSet,
};
use crate::modules::taxes::services::{CreditBreakdown, ImportCreditCalculator, TaxCascade};

/// Everything the engine needs besides per-request inputs
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub rule_set: TaxRuleSet,
    /// Applied to products whose classification could not be resolved
    pub default_profile: NcmTaxProfile,
    pub credit_policy: CreditPolicy,
    pub resale_tax_rate: ResaleTaxRate,
    /// Insurance as a fraction of FOB + freight when none is supplied
    pub insurance_rate: Decimal,
    pub allocation: AllocationPolicy,
}

/// Items sharing the same tax rates
struct TaxGroup {
    profile: NcmTaxProfile,
    members: Vec<usize>,
}

pub struct ImportCostEngine {
    settings: EngineSettings,
}

impl ImportCostEngine {
    /// Validates the settings once; a constructed engine never meets a
    /// configuration error in `compute_import_cost` except for bracket data.
    pub fn new(settings: EngineSettings) -> Result<Self> {
        settings.default_profile.validate()?;
        settings.rule_set.validate(&settings.default_profile)?;
        settings.credit_policy.validate()?;
        validate_rate("Insurance rate", settings.insurance_rate)?;

        if settings.resale_tax_rate.complement() <= Decimal::ZERO {
            return Err(AppError::configuration(
                "Combined resale tax rate must be below 1.0",
            ));
        }

        info!(
            "Import cost engine ready: regime={}, resale rate={}, insurance rate={}",
            settings.rule_set.name(),
            settings.resale_tax_rate.total(),
            settings.insurance_rate
        );

        Ok(Self { settings })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn default_profile(&self) -> &NcmTaxProfile {
        &self.settings.default_profile
    }

    pub fn compute_import_cost(&self, input: &CalculationInput) -> Result<ImportCostResult> {
        Self::validate_input(input)?;

        let items = &input.line_items;
        let item_refs: Vec<&LineItem> = items.iter().collect();
        let rate = input.quotation.origin_to_brl;
        let mut flags = CalculationFlags {
            fallback_quotation: input.quotation.is_fallback(),
            stale_quotation: input.quotation.is_stale(),
            ..Default::default()
        };

        // Freight bracket
        let volumes = items.iter().map(|i| i.total_volume()).collect::<Result<Vec<_>>>()?;
        let weights = items.iter().map(|i| i.total_weight()).collect::<Result<Vec<_>>>()?;
        let volume = checked_sum(volumes, "shipment volume")?;
        let weight = checked_sum(weights, "shipment weight")?;
        let selection = BracketSelector::select(&input.brackets, volume)?;
        flags.bracket_fallback = selection.is_fallback();

        // Customs value
        let fobs: Vec<Decimal> = items
            .iter()
            .map(|i| i.fob_brl(rate))
            .collect::<Result<_>>()?;
        let total_fob = checked_sum(fobs.iter().copied(), "FOB value")?;
        let customs = CifAssembler::assemble(
            total_fob,
            input.freight_cost,
            input.insurance,
            self.settings.insurance_rate,
        )?;
        flags.insurance_defaulted = customs.insurance_defaulted;

        let cost_weights =
            CostAllocator::weights(&item_refs, &fobs, self.settings.allocation.cost_key)?;
        let freights = CostAllocator::split(customs.freight, &cost_weights)?;
        let insurances = CostAllocator::split(customs.insurance, &cost_weights)?;

        // Tax cascade and credits, per tax group
        let resolved: Vec<ResolvedTaxProfile> = (0..items.len())
            .map(|index| self.profile_for(index, input))
            .collect::<Result<_>>()?;
        for (item, profile) in items.iter().zip(&resolved) {
            if profile.source == ProfileSource::Default
                && !flags.defaulted_products.contains(&item.product_id)
            {
                flags.defaulted_products.push(item.product_id.clone());
            }
        }
        flags.default_tax_profile = !flags.defaulted_products.is_empty();

        let mut taxes = TaxAmounts::default();
        let mut credits = CreditBreakdown::default();
        let mut item_taxes = vec![TaxAmounts::default(); items.len()];
        let mut item_credits = vec![Decimal::ZERO; items.len()];

        for group in Self::group_by_rates(&resolved) {
            let rules = self.settings.rule_set.rules_for(&group.profile);
            let group_cif: Decimal = group
                .members
                .iter()
                .map(|i| fobs[*i] + freights[*i] + insurances[*i])
                .sum();

            let group_taxes = TaxCascade::compute(group_cif, &rules)?;
            let group_credits =
                ImportCreditCalculator::credits(&group_taxes, &rules, &self.settings.credit_policy);

            debug!(
                "Tax group {} ({} items): CIF {}, taxes {}, credits {}",
                group.profile.ncm,
                group.members.len(),
                group_cif,
                group_taxes.total(),
                group_credits.total
            );

            let member_items: Vec<&LineItem> = group.members.iter().map(|i| &items[*i]).collect();
            let member_fobs: Vec<Decimal> = group.members.iter().map(|i| fobs[*i]).collect();
            let member_weights = CostAllocator::weights(
                &member_items,
                &member_fobs,
                self.settings.allocation.cost_key,
            )?;
            let tax_shares = CostAllocator::split_taxes(&group_taxes, &member_weights)?;
            let credit_shares = CostAllocator::split(group_credits.total, &member_weights)?;

            for (position, index) in group.members.iter().enumerate() {
                item_taxes[*index] = tax_shares[position];
                item_credits[*index] = credit_shares[position];
            }

            taxes = taxes.add(&group_taxes);
            credits = credits.add(&group_credits);
        }

        let total_taxes = taxes.total();

        // Imported cost, credits, resale price
        let brazil_expenses = bounded_brl(selection.bracket.brazil_expenses, "Brazil expenses")?;
        let national_freight = input.national_freight.unwrap_or(Decimal::ZERO);
        let imported_cost = checked_sum(
            [customs.cif, total_taxes, brazil_expenses, national_freight],
            "imported cost",
        )
        .and_then(|total| bounded_brl(total, "imported cost"))?;

        let (post_credit_base, clamped) =
            ImportCreditCalculator::post_credit_base(imported_cost, credits.total);
        flags.credits_clamped = clamped;

        let resale_rate = &self.settings.resale_tax_rate;
        let resale_price = ReversePriceDeriver::resale_price(post_credit_base, resale_rate);

        // Per-item allocation
        let expense_weights =
            CostAllocator::weights(&item_refs, &fobs, self.settings.allocation.expenses_key)?;
        let item_expenses = CostAllocator::split(brazil_expenses, &expense_weights)?;
        let item_national = CostAllocator::split(national_freight, &expense_weights)?;

        let allocated = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                CostAllocator::finish(
                    ItemShares {
                        item,
                        ncm: resolved[i].profile.ncm.clone(),
                        profile_source: resolved[i].source,
                        fob: fobs[i],
                        freight: freights[i],
                        insurance: insurances[i],
                        taxes: item_taxes[i],
                        credits: item_credits[i],
                        brazil_expenses: item_expenses[i],
                        national_freight: item_national[i],
                    },
                    resale_rate,
                )
            })
            .collect();

        if flags.is_suspect() {
            warn!(
                "Credits {} exceed imported cost {}; check the credit policy and tax rates",
                credits.total, imported_cost
            );
        }

        if flags.is_fallback_derived() {
            warn!(
                "Calculation used substituted inputs: quotation fallback={}, stale={}, default profiles for {:?}",
                flags.fallback_quotation, flags.stale_quotation, flags.defaulted_products
            );
        }

        info!(
            "Import cost computed: CIF {}, taxes {}, imported cost {}, resale price {} ({} items, bracket {})",
            Currency::BRL.format_amount(customs.cif),
            Currency::BRL.format_amount(total_taxes),
            Currency::BRL.format_amount(imported_cost),
            Currency::BRL.format_amount(resale_price),
            items.len(),
            selection.bracket.id
        );

        let breakdown = CostBreakdown {
            fob: customs.fob,
            freight: customs.freight,
            insurance: customs.insurance,
            cif: customs.cif,
            taxes,
            total_taxes,
            brazil_expenses,
            national_freight,
            imported_cost,
            credits: credits.amounts,
            creditable_taxes: credits.total,
            post_credit_base,
            resale_tax_rate: resale_rate.total(),
            resale_price,
            bracket_id: selection.bracket.id.clone(),
            shipment_volume: volume,
            shipment_weight: weight,
            regime: self.settings.rule_set.name().to_string(),
            quotation: input.quotation.clone(),
            flags,
        };

        Ok(ImportCostResult {
            breakdown,
            items: allocated,
        })
    }

    fn validate_input(input: &CalculationInput) -> Result<()> {
        if input.line_items.is_empty() {
            return Err(AppError::validation(
                "Import cost calculation needs at least one line item",
            ));
        }

        for item in &input.line_items {
            item.validate()?;
        }

        if input.tax_profiles.len() > input.line_items.len() {
            return Err(AppError::validation(format!(
                "{} tax profiles given for {} line items",
                input.tax_profiles.len(),
                input.line_items.len()
            )));
        }

        input.quotation.validate()?;

        // Caller-supplied BRL amounts; the provider's freight cost is rounded later
        for amount in [input.insurance, input.national_freight].into_iter().flatten() {
            Currency::BRL
                .validate_amount(amount)
                .map_err(AppError::validation)?;
        }
        if let Some(national_freight) = input.national_freight {
            bounded_brl(national_freight, "national freight")?;
        }

        Ok(())
    }

    fn profile_for(&self, index: usize, input: &CalculationInput) -> Result<ResolvedTaxProfile> {
        match input.tax_profiles.get(index).and_then(Option::as_ref) {
            Some(resolved) => {
                resolved.profile.validate()?;
                Ok(resolved.clone())
            }
            None => Ok(ResolvedTaxProfile::defaulted(
                self.settings.default_profile.clone(),
            )),
        }
    }

    /// Group item indices by identical rates, in order of first appearance
    fn group_by_rates(resolved: &[ResolvedTaxProfile]) -> Vec<TaxGroup> {
        let mut groups: Vec<TaxGroup> = Vec::new();
        for (index, entry) in resolved.iter().enumerate() {
            match groups.iter_mut().find(|g| g.profile.same_rates(&entry.profile)) {
                Some(group) => group.members.push(index),
                None => groups.push(TaxGroup {
                    profile: entry.profile.clone(),
                    members: vec![index],
                }),
            }
        }
        groups
    }
}
