use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::pricing::models::{
    AllocatedItemCost, CostBreakdown, ImportCostResult, QuoteRequest,
};

/// Immutable snapshot of one calculation, handed to the persistence layer.
/// Recalculating always produces a new record with a new id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxCalculationRecord {
    pub id: String,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
    /// The request as received, so the calculation can be replayed
    pub request: QuoteRequest,
    pub breakdown: CostBreakdown,
    pub items: Vec<AllocatedItemCost>,
}

impl TaxCalculationRecord {
    pub fn new(request: QuoteRequest, result: ImportCostResult) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            reference: request.reference.clone(),
            created_at: Utc::now(),
            request,
            breakdown: result.breakdown,
            items: result.items,
        }
    }
}
