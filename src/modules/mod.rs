pub mod freight;
pub mod pricing;
pub mod quotations;
pub mod taxes;
