// Freight bracket ("boarding type"): a shipment-volume tier that carries the
// flat Brazil-side handling expenses for shipments falling inside its range.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// Volume-indexed freight/handling tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreightBracket {
    pub id: String,

    /// Display name (e.g. "LCL up to 1 m3")
    #[serde(default)]
    pub name: String,

    /// Inclusive lower bound of the shipment volume, in cubic meters
    pub volume_range_start: Decimal,

    /// Inclusive upper bound of the shipment volume, in cubic meters
    pub volume_range_end: Decimal,

    /// Flat customs-clearance and handling fee charged in Brazil (BRL)
    pub brazil_expenses: Decimal,

    /// Fallback bracket when no range contains the shipment volume
    #[serde(default)]
    pub is_default: bool,

    pub created_at: DateTime<Utc>,
}

impl FreightBracket {
    pub fn new(
        id: impl Into<String>,
        volume_range_start: Decimal,
        volume_range_end: Decimal,
        brazil_expenses: Decimal,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        let bracket = Self {
            id: id.into(),
            name: String::new(),
            volume_range_start,
            volume_range_end,
            brazil_expenses,
            is_default: false,
            created_at,
        };
        bracket.validate()?;
        Ok(bracket)
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// True when `volume` lies inside the inclusive range
    pub fn contains(&self, volume: Decimal) -> bool {
        self.volume_range_start <= volume && volume <= self.volume_range_end
    }

    pub fn validate(&self) -> Result<()> {
        if self.volume_range_start < Decimal::ZERO {
            return Err(AppError::configuration(format!(
                "Bracket {} has a negative range start: {}",
                self.id, self.volume_range_start
            )));
        }

        if self.volume_range_start > self.volume_range_end {
            return Err(AppError::configuration(format!(
                "Bracket {} range start {} exceeds range end {}",
                self.id, self.volume_range_start, self.volume_range_end
            )));
        }

        if self.brazil_expenses < Decimal::ZERO {
            return Err(AppError::configuration(format!(
                "Bracket {} has negative Brazil expenses: {}",
                self.id, self.brazil_expenses
            )));
        }

        Ok(())
    }
}

/// Why a bracket was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    /// The bracket range contains the shipment volume
    Contained,
    /// No range matched; the bracket flagged as default was used
    Default,
    /// No range matched and no default is flagged; earliest-created bracket
    Earliest,
}

/// Outcome of bracket selection for one shipment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketSelection {
    pub bracket: FreightBracket,
    pub reason: SelectionReason,
    pub shipment_volume: Decimal,
}

impl BracketSelection {
    pub fn is_fallback(&self) -> bool {
        self.reason != SelectionReason::Contained
    }
}
