use async_trait::async_trait;

use crate::core::Result;
use crate::modules::freight::models::FreightBracket;

/// Source of the configured freight bracket table
#[async_trait]
pub trait BracketRepository: Send + Sync {
    /// All brackets, in creation order
    async fn list_brackets(&self) -> Result<Vec<FreightBracket>>;
}

/// Bracket table held in memory
pub struct InMemoryBracketRepository {
    brackets: Vec<FreightBracket>,
}

impl InMemoryBracketRepository {
    /// Validates every bracket up front so a bad table fails at setup
    pub fn new(mut brackets: Vec<FreightBracket>) -> Result<Self> {
        for bracket in &brackets {
            bracket.validate()?;
        }
        brackets.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(Self { brackets })
    }
}

#[async_trait]
impl BracketRepository for InMemoryBracketRepository {
    async fn list_brackets(&self) -> Result<Vec<FreightBracket>> {
        Ok(self.brackets.clone())
    }
}
