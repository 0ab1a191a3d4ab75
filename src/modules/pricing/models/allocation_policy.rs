use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::modules::pricing::models::LineItem;

/// Quantity a line item is weighted by when an aggregate cost is split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationKey {
    /// FOB value in BRL
    #[default]
    Value,
    /// Total gross weight
    Weight,
    /// Total packed volume
    Volume,
}

impl AllocationKey {
    /// Weight of `item` under this key; `fob_brl` is the item's FOB in BRL
    pub fn weight_of(&self, item: &LineItem, fob_brl: Decimal) -> Result<Decimal> {
        match self {
            AllocationKey::Value => Ok(fob_brl),
            AllocationKey::Weight => item.total_weight(),
            AllocationKey::Volume => item.total_volume(),
        }
    }
}

impl std::str::FromStr for AllocationKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "value" => Ok(AllocationKey::Value),
            "weight" => Ok(AllocationKey::Weight),
            "volume" => Ok(AllocationKey::Volume),
            _ => Err(format!("Invalid allocation key: {}", s)),
        }
    }
}

/// Keys used to spread aggregate costs back onto line items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AllocationPolicy {
    /// Freight, insurance, import taxes and credits
    pub cost_key: AllocationKey,
    /// Bracket Brazil expenses and national freight
    pub expenses_key: AllocationKey,
}
