use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::{AppError, Result};
use crate::modules::freight::repositories::BracketRepository;
use crate::modules::freight::services::{BracketSelector, FreightCostProvider, FreightRequest};
use crate::modules::pricing::models::{CalculationInput, QuoteRequest, TaxCalculationRecord};
use crate::modules::pricing::services::import_cost_engine::ImportCostEngine;
use crate::modules::quotations::services::QuotationService;
use crate::modules::taxes::models::ResolvedTaxProfile;
use crate::modules::taxes::repositories::NcmRateRepository;

/// Resolves every collaborator input of a quote and runs the engine
pub struct ImportCostService {
    engine: Arc<ImportCostEngine>,
    ncm_repo: Arc<dyn NcmRateRepository>,
    quotations: Arc<QuotationService>,
    bracket_repo: Arc<dyn BracketRepository>,
    freight_provider: Arc<dyn FreightCostProvider>,
}

impl ImportCostService {
    pub fn new(
        engine: Arc<ImportCostEngine>,
        ncm_repo: Arc<dyn NcmRateRepository>,
        quotations: Arc<QuotationService>,
        bracket_repo: Arc<dyn BracketRepository>,
        freight_provider: Arc<dyn FreightCostProvider>,
    ) -> Self {
        Self {
            engine,
            ncm_repo,
            quotations,
            bracket_repo,
            freight_provider,
        }
    }

    /// Quote the import cost of a cart.
    ///
    /// Unknown classifications and quotation outages are substituted and
    /// flagged on the record; an empty bracket table or a failing freight
    /// provider aborts the quote.
    pub async fn quote(&self, request: QuoteRequest) -> Result<TaxCalculationRecord> {
        if request.line_items.is_empty() {
            return Err(AppError::validation("Quote must have at least one line item"));
        }
        for item in &request.line_items {
            item.validate()?;
        }

        let tax_profiles = self.resolve_profiles(&request).await;
        let quotation = self.quotations.resolve(request.origin_currency).await;

        let brackets = self.bracket_repo.list_brackets().await?;
        let volume = request.total_volume()?;
        let selection = BracketSelector::select(&brackets, volume)?;

        let freight_request = FreightRequest::for_bracket(
            request.origin.clone(),
            request.destination.clone(),
            request.total_weight()?,
            volume,
            &selection.bracket,
        );
        let freight_cost = self
            .freight_provider
            .quote(&freight_request)
            .await
            .map_err(|e| {
                AppError::provider(format!(
                    "Freight provider {} failed: {}",
                    self.freight_provider.name(),
                    e
                ))
            })?;

        debug!(
            "Freight {} → {} via {}: {} (bracket {})",
            freight_request.origin,
            freight_request.destination,
            self.freight_provider.name(),
            freight_cost,
            selection.bracket.id
        );

        let input = CalculationInput {
            line_items: request.line_items.clone(),
            tax_profiles,
            quotation,
            brackets,
            freight_cost,
            insurance: request.insurance,
            national_freight: request.national_freight,
        };

        let result = self.engine.compute_import_cost(&input)?;
        let record = TaxCalculationRecord::new(request, result);

        info!(
            "Quote {} recorded (reference {:?}, resale price {})",
            record.id, record.reference, record.breakdown.resale_price
        );

        Ok(record)
    }

    /// Profile per line. Lookup failures and misses fall back to the
    /// default profile; lines without a classification stay `None` so the
    /// engine applies and flags the default. Each NCM is looked up once.
    async fn resolve_profiles(&self, request: &QuoteRequest) -> Vec<Option<ResolvedTaxProfile>> {
        let mut by_ncm: HashMap<String, ResolvedTaxProfile> = HashMap::new();
        let mut profiles = Vec::with_capacity(request.line_items.len());

        for item in &request.line_items {
            let Some(ncm) = item.ncm.as_deref() else {
                warn!(
                    "Product {} has no NCM classification; using default tax profile",
                    item.product_id
                );
                profiles.push(None);
                continue;
            };

            if let Some(resolved) = by_ncm.get(ncm) {
                profiles.push(Some(resolved.clone()));
                continue;
            }

            let resolved = match self.ncm_repo.find_by_ncm(ncm).await {
                Ok(Some(profile)) => ResolvedTaxProfile::lookup(profile),
                Ok(None) => {
                    warn!(
                        "NCM {} of product {} not found; using default tax profile",
                        ncm, item.product_id
                    );
                    ResolvedTaxProfile::defaulted(self.engine.default_profile().clone())
                }
                Err(e) => {
                    warn!(
                        "NCM lookup for product {} failed: {}; using default tax profile",
                        item.product_id, e
                    );
                    ResolvedTaxProfile::defaulted(self.engine.default_profile().clone())
                }
            };

            by_ncm.insert(ncm.to_string(), resolved.clone());
            profiles.push(Some(resolved));
        }

        profiles
    }
}
