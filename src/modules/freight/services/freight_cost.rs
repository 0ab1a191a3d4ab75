use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};
use crate::modules::freight::models::FreightBracket;

/// International freight cost provider (forwarder quote, allocation table...)
#[async_trait]
pub trait FreightCostProvider: Send + Sync {
    /// Quote the international freight cost in BRL for a shipment
    async fn quote(&self, request: &FreightRequest) -> Result<Decimal>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Shipment characteristics sent to the freight provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreightRequest {
    pub origin: String,
    pub destination: String,
    /// Total shipment weight in kilograms
    pub total_weight: Decimal,
    /// Total shipment volume in cubic meters
    pub total_volume: Decimal,
    /// Bracket the shipment was classified into
    pub bracket_id: String,
}

impl FreightRequest {
    pub fn for_bracket(
        origin: impl Into<String>,
        destination: impl Into<String>,
        total_weight: Decimal,
        total_volume: Decimal,
        bracket: &FreightBracket,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            total_weight,
            total_volume,
            bracket_id: bracket.id.clone(),
        }
    }
}

/// Provider that answers from a fixed cost per bracket, with an optional
/// catch-all amount for brackets it does not list
#[derive(Debug, Clone, Default)]
pub struct FixedFreightCostProvider {
    by_bracket: Vec<(String, Decimal)>,
    fallback: Option<Decimal>,
}

impl FixedFreightCostProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same freight cost regardless of bracket
    pub fn flat(cost: Decimal) -> Self {
        Self {
            by_bracket: Vec::new(),
            fallback: Some(cost),
        }
    }

    pub fn with_bracket_cost(mut self, bracket_id: impl Into<String>, cost: Decimal) -> Self {
        self.by_bracket.push((bracket_id.into(), cost));
        self
    }
}

#[async_trait]
impl FreightCostProvider for FixedFreightCostProvider {
    async fn quote(&self, request: &FreightRequest) -> Result<Decimal> {
        self.by_bracket
            .iter()
            .find(|(id, _)| *id == request.bracket_id)
            .map(|(_, cost)| *cost)
            .or(self.fallback)
            .ok_or_else(|| {
                AppError::provider(format!(
                    "no freight cost available for bracket {}",
                    request.bracket_id
                ))
            })
    }

    fn name(&self) -> &str {
        "fixed"
    }
}
