pub mod bracket_repository;

pub use bracket_repository::{BracketRepository, InMemoryBracketRepository};
