use std::cmp::Ordering;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::core::{AppError, Result};
use crate::modules::freight::models::{BracketSelection, FreightBracket, SelectionReason};

/// Picks the freight bracket that applies to a shipment volume.
///
/// Among brackets whose inclusive range contains the volume, the tightest one
/// wins: smallest range end first, then largest range start. Remaining ties
/// go to the earliest-created bracket and finally to the lowest id, so the
/// choice never depends on the order the table was loaded in.
pub struct BracketSelector;

impl BracketSelector {
    pub fn select(brackets: &[FreightBracket], volume: Decimal) -> Result<BracketSelection> {
        if brackets.is_empty() {
            return Err(AppError::no_bracket(
                "no freight brackets are configured",
            ));
        }

        let tightest = brackets
            .iter()
            .filter(|b| b.contains(volume))
            .min_by(|a, b| Self::tightness_order(a, b));

        if let Some(bracket) = tightest {
            debug!(
                "Volume {} m3 matched bracket {} [{}, {}]",
                volume, bracket.id, bracket.volume_range_start, bracket.volume_range_end
            );
            return Ok(BracketSelection {
                bracket: bracket.clone(),
                reason: SelectionReason::Contained,
                shipment_volume: volume,
            });
        }

        let (bracket, reason) = match brackets
            .iter()
            .filter(|b| b.is_default)
            .min_by(|a, b| Self::age_order(a, b))
        {
            Some(default) => (default, SelectionReason::Default),
            None => {
                // Non-empty slice, so an earliest bracket always exists
                let earliest = brackets
                    .iter()
                    .min_by(|a, b| Self::age_order(a, b))
                    .ok_or_else(|| AppError::no_bracket("no freight brackets are configured"))?;
                (earliest, SelectionReason::Earliest)
            }
        };

        warn!(
            "Volume {} m3 is outside every bracket range, falling back to bracket {} ({:?})",
            volume, bracket.id, reason
        );

        Ok(BracketSelection {
            bracket: bracket.clone(),
            reason,
            shipment_volume: volume,
        })
    }

    fn tightness_order(a: &FreightBracket, b: &FreightBracket) -> Ordering {
        a.volume_range_end
            .cmp(&b.volume_range_end)
            .then_with(|| b.volume_range_start.cmp(&a.volume_range_start))
            .then_with(|| Self::age_order(a, b))
    }

    fn age_order(a: &FreightBracket, b: &FreightBracket) -> Ordering {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    }
}
