use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::modules::taxes::models::{ProfileSource, TaxAmounts};

/// One line item's share of the aggregate `CostBreakdown`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocatedItemCost {
    pub product_id: String,
    pub variation: Option<String>,
    pub quantity: u32,
    pub ncm: String,
    pub profile_source: ProfileSource,
    pub fob: Decimal,
    pub freight: Decimal,
    pub insurance: Decimal,
    pub cif: Decimal,
    pub taxes: TaxAmounts,
    pub total_taxes: Decimal,
    pub brazil_expenses: Decimal,
    pub national_freight: Decimal,
    pub imported_cost: Decimal,
    pub creditable_taxes: Decimal,
    pub post_credit_base: Decimal,
    pub resale_price: Decimal,
    pub unit_resale_price: Decimal,
}
