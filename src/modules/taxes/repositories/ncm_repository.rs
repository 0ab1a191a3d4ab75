use std::collections::HashMap;

use async_trait::async_trait;

use crate::core::Result;
use crate::modules::taxes::models::ncm_profile::normalize_ncm;
use crate::modules::taxes::models::NcmTaxProfile;

/// NCM classification → import tax rate lookup
#[async_trait]
pub trait NcmRateRepository: Send + Sync {
    /// Rates for a classification code, or `None` when the code is unknown
    async fn find_by_ncm(&self, ncm: &str) -> Result<Option<NcmTaxProfile>>;
}

/// Rate table held in memory, keyed by normalized NCM code
#[derive(Debug, Clone, Default)]
pub struct InMemoryNcmRateRepository {
    profiles: HashMap<String, NcmTaxProfile>,
}

impl InMemoryNcmRateRepository {
    pub fn new(profiles: Vec<NcmTaxProfile>) -> Result<Self> {
        let mut table = HashMap::with_capacity(profiles.len());
        for profile in profiles {
            profile.validate()?;
            table.insert(normalize_ncm(&profile.ncm), profile);
        }
        Ok(Self { profiles: table })
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[async_trait]
impl NcmRateRepository for InMemoryNcmRateRepository {
    async fn find_by_ncm(&self, ncm: &str) -> Result<Option<NcmTaxProfile>> {
        Ok(self.profiles.get(&normalize_ncm(ncm)).cloned())
    }
}
