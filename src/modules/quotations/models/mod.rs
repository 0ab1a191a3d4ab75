pub mod exchange_quotation;

pub use exchange_quotation::{ExchangeQuotation, QuotationSource};
