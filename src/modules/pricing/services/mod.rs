pub mod cif_assembler;
pub mod cost_allocator;
pub mod import_cost_engine;
pub mod import_cost_service;
pub mod resale_price;

pub use cif_assembler::{CifAssembler, CustomsValue};
pub use cost_allocator::CostAllocator;
pub use import_cost_engine::{EngineSettings, ImportCostEngine};
pub use import_cost_service::ImportCostService;
pub use resale_price::{ResaleTaxRate, ReversePriceDeriver};
