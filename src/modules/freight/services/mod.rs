pub mod bracket_selector;
pub mod freight_cost;

pub use bracket_selector::BracketSelector;
pub use freight_cost::{FixedFreightCostProvider, FreightCostProvider, FreightRequest};
