pub mod quotation_provider;

pub use quotation_provider::{QuotationProvider, StaticQuotationProvider};
