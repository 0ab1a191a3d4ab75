use std::io::Read;
use std::sync::Arc;

use importcost::config::Config;
use importcost::core::{AppError, Result, TtlCache};
use importcost::freight::{FixedFreightCostProvider, FreightBracket, InMemoryBracketRepository};
use importcost::pricing::{ImportCostEngine, ImportCostService, QuoteRequest};
use importcost::quotations::{ExchangeQuotation, QuotationService, StaticQuotationProvider};
use importcost::taxes::{InMemoryNcmRateRepository, NcmTaxProfile};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Everything one run needs: the cart plus the data the collaborators serve
#[derive(Debug, Deserialize)]
struct QuoteFile {
    request: QuoteRequest,
    #[serde(default)]
    ncm_table: Vec<NcmTaxProfile>,
    brackets: Vec<FreightBracket>,
    freight_cost: Decimal,
    /// Live quotation; omitted means the provider is unavailable
    #[serde(default)]
    quotation: Option<ExchangeQuotation>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "importcost=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        tracing::error!("Quote failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Tax regime: {}", config.pricing.rule_set().name());

    let quote_file: QuoteFile = serde_json::from_str(&read_input()?)?;

    let engine = Arc::new(ImportCostEngine::new(config.engine_settings()?)?);

    let provider = match quote_file.quotation {
        Some(quotation) => StaticQuotationProvider::new(quotation),
        None => StaticQuotationProvider::unavailable(),
    };
    let quotations = Arc::new(QuotationService::new(
        Arc::new(provider),
        Arc::new(TtlCache::new()),
        config.quotation_settings(),
    ));

    let service = ImportCostService::new(
        engine,
        Arc::new(InMemoryNcmRateRepository::new(quote_file.ncm_table)?),
        quotations,
        Arc::new(InMemoryBracketRepository::new(quote_file.brackets)?),
        Arc::new(FixedFreightCostProvider::flat(quote_file.freight_cost)),
    );

    let record = service.quote(quote_file.request).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);

    Ok(())
}

/// Request JSON from the path given as first argument, or stdin
fn read_input() -> Result<String> {
    match std::env::args().nth(1) {
        Some(path) => Ok(std::fs::read_to_string(&path)
            .map_err(|e| AppError::validation(format!("Cannot read {}: {}", path, e)))?),
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}
