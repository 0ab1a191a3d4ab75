//! Import cost and tax calculation engine
//!
//! Turns a cart of products bought abroad into its landed cost in BRL:
//! customs value, the cascading import taxes, the creditable share of those
//! taxes, and the resale price that recovers the net cost after domestic
//! resale taxes. Every figure is also allocated back onto the line items.

pub mod config;
pub mod core;
pub mod modules;

// Re-export commonly used types
pub use crate::core::{AppError, Currency, Result};
pub use modules::freight;
pub use modules::pricing;
pub use modules::quotations;
pub use modules::taxes;
