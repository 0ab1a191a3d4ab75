pub mod models;
pub mod repositories;
pub mod services;

pub use models::{BracketSelection, FreightBracket, SelectionReason};
pub use repositories::{BracketRepository, InMemoryBracketRepository};
pub use services::{BracketSelector, FreightCostProvider, FreightRequest, FixedFreightCostProvider};
