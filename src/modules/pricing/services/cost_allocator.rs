use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

use crate::core::{checked_sum, round_brl, AppError, Currency, Result};
use crate::modules::pricing::models::{AllocatedItemCost, AllocationKey, LineItem};
use crate::modules::pricing::services::resale_price::{ResaleTaxRate, ReversePriceDeriver};
use crate::modules::taxes::models::{ProfileSource, TaxAmounts, TaxKind};

/// Amounts already assigned to one item before the derived fields are filled
#[derive(Debug, Clone)]
pub struct ItemShares<'a> {
    pub item: &'a LineItem,
    pub ncm: String,
    pub profile_source: ProfileSource,
    pub fob: Decimal,
    pub freight: Decimal,
    pub insurance: Decimal,
    pub taxes: TaxAmounts,
    pub credits: Decimal,
    pub brazil_expenses: Decimal,
    pub national_freight: Decimal,
}

/// Spreads aggregate costs back onto line items.
///
/// Every split is exact to the cent: shares are truncated to cents and the
/// leftover cents go to the items with the largest truncated remainders.
pub struct CostAllocator;

impl CostAllocator {
    /// Split `total` proportionally to `weights`; the result sums to `total`
    pub fn split(total: Decimal, weights: &[Decimal]) -> Result<Vec<Decimal>> {
        let total = round_brl(total);

        if total < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Cannot allocate a negative amount: {}",
                total
            )));
        }

        if weights.iter().any(|w| *w < Decimal::ZERO) {
            return Err(AppError::validation("Allocation weights must be non-negative"));
        }

        let weight_sum = checked_sum(weights.iter().copied(), "allocation weight")?;
        if weight_sum.is_zero() {
            if total.is_zero() {
                return Ok(vec![Decimal::ZERO; weights.len()]);
            }
            return Err(AppError::internal(format!(
                "Cannot allocate {} over zero total weight",
                total
            )));
        }

        let raw: Vec<Decimal> = weights.iter().map(|w| total * (*w / weight_sum)).collect();
        let mut shares: Vec<Decimal> = raw
            .iter()
            .map(|r| r.round_dp_with_strategy(Currency::BRL.scale(), RoundingStrategy::ToZero))
            .collect();

        let mut order: Vec<usize> = (0..weights.len())
            .filter(|i| !weights[*i].is_zero())
            .collect();
        order.sort_by(|a, b| {
            let rem_a = raw[*a] - shares[*a];
            let rem_b = raw[*b] - shares[*b];
            rem_b.cmp(&rem_a).then_with(|| a.cmp(b))
        });

        let cent = Currency::BRL.smallest_unit();
        let mut remaining = total - shares.iter().sum::<Decimal>();
        for index in &order {
            if remaining < cent {
                break;
            }
            shares[*index] += cent;
            remaining -= cent;
        }

        Ok(shares)
    }

    /// Split each tax line independently
    pub fn split_taxes(taxes: &TaxAmounts, weights: &[Decimal]) -> Result<Vec<TaxAmounts>> {
        let mut split = vec![TaxAmounts::default(); weights.len()];
        for kind in TaxKind::ALL {
            for (target, share) in split.iter_mut().zip(Self::split(taxes.get(kind), weights)?) {
                target.set(kind, share);
            }
        }
        Ok(split)
    }

    /// Weight of each item under `key`. When every item weighs zero (a cart
    /// of free samples under the value key, say) quantities are used instead.
    pub fn weights(
        items: &[&LineItem],
        fobs: &[Decimal],
        key: AllocationKey,
    ) -> Result<Vec<Decimal>> {
        let weights: Vec<Decimal> = items
            .iter()
            .zip(fobs)
            .map(|(item, fob)| key.weight_of(item, *fob))
            .collect::<Result<_>>()?;

        if weights.iter().all(|w| w.is_zero()) {
            warn!(
                "All {} line items weigh zero by {:?}; allocating by quantity",
                items.len(),
                key
            );
            return Ok(items.iter().map(|i| Decimal::from(i.quantity)).collect());
        }

        Ok(weights)
    }

    /// Derive the item's imported cost, post-credit base and resale prices.
    /// The resale price is recomputed from the item's own base, not prorated.
    pub fn finish(shares: ItemShares<'_>, resale_rate: &ResaleTaxRate) -> AllocatedItemCost {
        let cif = shares.fob + shares.freight + shares.insurance;
        let total_taxes = shares.taxes.total();
        let imported_cost = cif + total_taxes + shares.brazil_expenses + shares.national_freight;
        let post_credit_base = (imported_cost - shares.credits).max(Decimal::ZERO);
        let resale_price = ReversePriceDeriver::resale_price(post_credit_base, resale_rate);

        AllocatedItemCost {
            product_id: shares.item.product_id.clone(),
            variation: shares.item.variation.clone(),
            quantity: shares.item.quantity,
            ncm: shares.ncm,
            profile_source: shares.profile_source,
            fob: shares.fob,
            freight: shares.freight,
            insurance: shares.insurance,
            cif,
            taxes: shares.taxes,
            total_taxes,
            brazil_expenses: shares.brazil_expenses,
            national_freight: shares.national_freight,
            imported_cost,
            creditable_taxes: shares.credits,
            post_credit_base,
            resale_price,
            unit_resale_price: ReversePriceDeriver::unit_price(resale_price, shares.item.quantity),
        }
    }
}
