pub mod credit_policy;
pub mod ncm_profile;
pub mod tax_kind;
pub mod tax_rule_set;

pub use credit_policy::{CreditException, CreditPolicy};
pub use ncm_profile::{NcmTaxProfile, ProfileSource, ResolvedTaxProfile};
pub use tax_kind::{TaxAmounts, TaxKind};
pub use tax_rule_set::{TaxBase, TaxLineRule, TaxMethod, TaxRuleSet};
