use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{checked_sum, Currency, Result};
use crate::modules::freight::models::FreightBracket;
use crate::modules::pricing::models::{AllocatedItemCost, CostBreakdown, LineItem};
use crate::modules::quotations::models::ExchangeQuotation;
use crate::modules::taxes::models::ResolvedTaxProfile;

/// Fully resolved inputs of one engine run. No I/O happens past this point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationInput {
    pub line_items: Vec<LineItem>,
    /// Tax profile per line, aligned with `line_items`. `None` entries and
    /// lines past the end use the default profile.
    #[serde(default)]
    pub tax_profiles: Vec<Option<ResolvedTaxProfile>>,
    pub quotation: ExchangeQuotation,
    pub brackets: Vec<FreightBracket>,
    /// International freight cost in BRL
    pub freight_cost: Decimal,
    /// Externally supplied insurance in BRL; derived from the rate when absent
    #[serde(default)]
    pub insurance: Option<Decimal>,
    /// Domestic leg from the port to the warehouse, in BRL
    #[serde(default)]
    pub national_freight: Option<Decimal>,
}

/// Aggregate breakdown plus its per-item allocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportCostResult {
    pub breakdown: CostBreakdown,
    pub items: Vec<AllocatedItemCost>,
}

/// Quote request handled by the input-resolution layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Caller reference (cart id, order id...) copied onto the record
    #[serde(default)]
    pub reference: Option<String>,
    pub line_items: Vec<LineItem>,
    #[serde(default = "default_origin_currency")]
    pub origin_currency: Currency,
    #[serde(default = "default_origin")]
    pub origin: String,
    #[serde(default = "default_destination")]
    pub destination: String,
    #[serde(default)]
    pub insurance: Option<Decimal>,
    #[serde(default)]
    pub national_freight: Option<Decimal>,
}

fn default_origin_currency() -> Currency {
    Currency::CNY
}

fn default_origin() -> String {
    "CN".to_string()
}

fn default_destination() -> String {
    "BR".to_string()
}

impl QuoteRequest {
    pub fn new(line_items: Vec<LineItem>) -> Self {
        Self {
            reference: None,
            line_items,
            origin_currency: default_origin_currency(),
            origin: default_origin(),
            destination: default_destination(),
            insurance: None,
            national_freight: None,
        }
    }

    pub fn total_volume(&self) -> Result<Decimal> {
        let volumes = self
            .line_items
            .iter()
            .map(|i| i.total_volume())
            .collect::<Result<Vec<_>>>()?;
        checked_sum(volumes, "shipment volume")
    }

    pub fn total_weight(&self) -> Result<Decimal> {
        let weights = self
            .line_items
            .iter()
            .map(|i| i.total_weight())
            .collect::<Result<Vec<_>>>()?;
        checked_sum(weights, "shipment weight")
    }
}
