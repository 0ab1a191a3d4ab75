pub mod freight_bracket;

pub use freight_bracket::{BracketSelection, FreightBracket, SelectionReason};
