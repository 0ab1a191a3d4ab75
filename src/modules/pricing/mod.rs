pub mod models;
pub mod services;

pub use models::{
    AllocatedItemCost, AllocationKey, AllocationPolicy, CalculationFlags, CalculationInput,
    CostBreakdown, ImportCostResult, LineItem, QuoteRequest, TaxCalculationRecord,
};
pub use services::{
    CifAssembler, CostAllocator, CustomsValue, EngineSettings, ImportCostEngine,
    ImportCostService, ResaleTaxRate, ReversePriceDeriver,
};
