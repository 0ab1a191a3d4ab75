pub mod models;
pub mod repositories;
pub mod services;

pub use models::{ExchangeQuotation, QuotationSource};
pub use repositories::{QuotationProvider, StaticQuotationProvider};
pub use services::{QuotationService, QuotationSettings};
