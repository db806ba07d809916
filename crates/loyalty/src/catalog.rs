//! Promotion listings as returned by the promotions API: parsing, sanity
//! checks and active-window filtering before they reach the engine.

use chrono::{DateTime, Utc};
use pointpulse_core::error::{PointPulseError, PointPulseResult};
use pointpulse_core::promotion::Promotion;
use std::collections::HashSet;
use tracing::debug;

/// Parse a JSON array of promotions and validate it.
pub fn parse_catalog(json: &str) -> PointPulseResult<Vec<Promotion>> {
    let promotions: Vec<Promotion> = serde_json::from_str(json)?;
    validate_catalog(&promotions)?;
    debug!(count = promotions.len(), "Promotion catalog parsed");
    Ok(promotions)
}

/// Ids must be unique and every promotion must reward something.
pub fn validate_catalog(promotions: &[Promotion]) -> PointPulseResult<()> {
    let mut seen = HashSet::new();
    for promotion in promotions {
        if !seen.insert(promotion.id) {
            return Err(PointPulseError::Catalog(format!(
                "duplicate promotion id {}",
                promotion.id
            )));
        }
        if !promotion.has_reward() {
            return Err(PointPulseError::Catalog(format!(
                "promotion {} has neither rate nor points",
                promotion.id
            )));
        }
    }
    Ok(())
}

pub fn active_promotions(promotions: &[Promotion], now: DateTime<Utc>) -> Vec<Promotion> {
    promotions
        .iter()
        .filter(|p| p.is_active_at(now))
        .cloned()
        .collect()
}

pub fn automatic_only(promotions: &[Promotion]) -> Vec<Promotion> {
    promotions.iter().filter(|p| p.is_automatic()).cloned().collect()
}

pub fn one_time_only(promotions: &[Promotion]) -> Vec<Promotion> {
    promotions.iter().filter(|p| p.is_one_time()).cloned().collect()
}
