pub mod cache;
pub mod currency;
pub mod error;

pub use cache::TtlCache;
pub use currency::{bounded_brl, checked_sum, round_brl, Currency};
pub use error::{AppError, Result};
