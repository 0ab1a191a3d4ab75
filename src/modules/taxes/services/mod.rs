pub mod import_credit;
pub mod tax_cascade;

pub use import_credit::{CreditBreakdown, ImportCreditCalculator};
pub use tax_cascade::TaxCascade;
