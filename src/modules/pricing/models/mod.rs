pub mod allocated_item_cost;
pub mod allocation_policy;
pub mod calculation;
pub mod cost_breakdown;
pub mod line_item;
pub mod tax_calculation_record;

pub use allocated_item_cost::AllocatedItemCost;
pub use allocation_policy::{AllocationKey, AllocationPolicy};
pub use calculation::{CalculationInput, ImportCostResult, QuoteRequest};
pub use cost_breakdown::{CalculationFlags, CostBreakdown};
pub use line_item::LineItem;
pub use tax_calculation_record::TaxCalculationRecord;
