pub mod models;
pub mod repositories;
pub mod services;

pub use models::{
    CreditException, CreditPolicy, NcmTaxProfile, ProfileSource, ResolvedTaxProfile, TaxAmounts,
    TaxBase, TaxKind, TaxLineRule, TaxMethod, TaxRuleSet,
};
pub use repositories::{InMemoryNcmRateRepository, NcmRateRepository};
pub use services::{CreditBreakdown, ImportCreditCalculator, TaxCascade};
