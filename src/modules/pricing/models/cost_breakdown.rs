use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::modules::quotations::models::ExchangeQuotation;
use crate::modules::taxes::models::TaxAmounts;

/// Substitutions and anomalies a report should surface next to the numbers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationFlags {
    /// The quotation is the documented default pair
    pub fallback_quotation: bool,
    /// The quotation is a last known value past its freshness window
    pub stale_quotation: bool,
    /// At least one product used the default tax profile
    pub default_tax_profile: bool,
    pub defaulted_products: Vec<String>,
    /// No bracket range contained the shipment volume
    pub bracket_fallback: bool,
    /// Insurance was derived from the default rate
    pub insurance_defaulted: bool,
    /// Credits exceeded the imported cost and the base was clamped to zero
    pub credits_clamped: bool,
}

impl CalculationFlags {
    /// The numbers are mathematically valid but rest on misconfigured rates
    pub fn is_suspect(&self) -> bool {
        self.credits_clamped
    }

    pub fn is_fallback_derived(&self) -> bool {
        self.fallback_quotation || self.stale_quotation || self.default_tax_profile
    }
}

/// Aggregate import cost of a shipment, all amounts in BRL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub fob: Decimal,
    pub freight: Decimal,
    pub insurance: Decimal,
    /// Customs value: FOB + freight + insurance
    pub cif: Decimal,
    pub taxes: TaxAmounts,
    pub total_taxes: Decimal,
    /// Flat fee of the selected freight bracket
    pub brazil_expenses: Decimal,
    pub national_freight: Decimal,
    /// CIF + taxes + Brazil expenses + national freight
    pub imported_cost: Decimal,
    pub credits: TaxAmounts,
    pub creditable_taxes: Decimal,
    /// Imported cost net of credits, never negative
    pub post_credit_base: Decimal,
    pub resale_tax_rate: Decimal,
    /// Price that nets `post_credit_base` after resale taxes
    pub resale_price: Decimal,
    pub bracket_id: String,
    pub shipment_volume: Decimal,
    pub shipment_weight: Decimal,
    pub regime: String,
    pub quotation: ExchangeQuotation,
    pub flags: CalculationFlags,
}
