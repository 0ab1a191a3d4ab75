pub mod ncm_repository;

pub use ncm_repository::{InMemoryNcmRateRepository, NcmRateRepository};
