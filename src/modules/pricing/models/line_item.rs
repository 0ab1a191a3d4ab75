// A cart line to be imported: one product (or product variation) with its
// supplier price in the origin currency and its shipping characteristics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{round_brl, AppError, Result};

/// Represents a single product line in an import quotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Catalog product identifier
    pub product_id: String,

    /// Product variation (color, size...) when the cart distinguishes them
    #[serde(default)]
    pub variation: Option<String>,

    /// Supplier (FOB) price per unit, in the origin currency
    pub unit_price: Decimal,

    /// Units ordered
    pub quantity: u32,

    /// Packed volume per unit, in cubic meters
    #[serde(default)]
    pub unit_volume: Decimal,

    /// Gross weight per unit, in kilograms
    #[serde(default)]
    pub unit_weight: Decimal,

    /// NCM customs classification, when the catalog has one
    #[serde(default)]
    pub ncm: Option<String>,
}

impl LineItem {
    /// Create a new line item with validation
    ///
    /// # Arguments
    /// * `product_id` - Catalog product identifier (non-empty)
    /// * `unit_price` - Must be non-negative
    /// * `quantity` - Must be positive
    /// * `unit_volume` / `unit_weight` - Must be non-negative
    pub fn new(
        product_id: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
        unit_volume: Decimal,
        unit_weight: Decimal,
    ) -> Result<Self> {
        let item = Self {
            product_id: product_id.into(),
            variation: None,
            unit_price,
            quantity,
            unit_volume,
            unit_weight,
            ncm: None,
        };
        item.validate()?;
        Ok(item)
    }

    pub fn with_ncm(mut self, ncm: impl Into<String>) -> Self {
        self.ncm = Some(ncm.into());
        self
    }

    pub fn with_variation(mut self, variation: impl Into<String>) -> Self {
        self.variation = Some(variation.into());
        self
    }

    /// FOB value in BRL: unit price × rate × quantity, rounded to cents
    pub fn fob_brl(&self, origin_to_brl: Decimal) -> Result<Decimal> {
        self.unit_price
            .checked_mul(origin_to_brl)
            .and_then(|value| value.checked_mul(Decimal::from(self.quantity)))
            .map(round_brl)
            .ok_or_else(|| self.overflow("FOB value"))
    }

    pub fn total_volume(&self) -> Result<Decimal> {
        self.unit_volume
            .checked_mul(Decimal::from(self.quantity))
            .ok_or_else(|| self.overflow("volume"))
    }

    pub fn total_weight(&self) -> Result<Decimal> {
        self.unit_weight
            .checked_mul(Decimal::from(self.quantity))
            .ok_or_else(|| self.overflow("weight"))
    }

    fn overflow(&self, what: &str) -> AppError {
        AppError::overflow(format!("{} of product {}", what, self.product_id))
    }

    pub fn validate(&self) -> Result<()> {
        if self.product_id.trim().is_empty() {
            return Err(AppError::validation("Line item product id cannot be empty"));
        }

        if self.quantity == 0 {
            return Err(AppError::validation(format!(
                "Quantity must be positive for product {}",
                self.product_id
            )));
        }

        if self.unit_price < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Unit price must be non-negative for product {}, got: {}",
                self.product_id, self.unit_price
            )));
        }

        if self.unit_volume < Decimal::ZERO || self.unit_weight < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Unit volume and weight must be non-negative for product {}",
                self.product_id
            )));
        }

        Ok(())
    }
}
