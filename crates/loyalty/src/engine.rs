//! Promotion engine: resolves which promotions apply to a purchase, keeps a
//! selection consistent as the amount changes, and computes earned points.

use pointpulse_core::config::PointsConfig;
use pointpulse_core::promotion::{Amount, PointsResult, Promotion, PromotionSet};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info, warn};

use crate::selection::{PromotionSelection, RevalidateOutcome, ToggleOutcome, ToggleRejection};

/// Promotion engine: stateless computation over a purchase draft.
#[derive(Debug, Clone)]
pub struct PromotionEngine {
    config: PointsConfig,
}

impl Default for PromotionEngine {
    fn default() -> Self {
        Self::new(&PointsConfig::default())
    }
}

impl PromotionEngine {
    pub fn new(config: &PointsConfig) -> Self {
        let mut config = config.clone();
        if config.cents_per_point == 0 {
            warn!("cents_per_point of zero is invalid, using default");
            config.cents_per_point = PointsConfig::default().cents_per_point;
        }
        debug!(cents_per_point = config.cents_per_point, "Promotion engine initialized");
        Self { config }
    }

    pub fn config(&self) -> &PointsConfig {
        &self.config
    }

    /// The automatic promotions that apply at `amount`.
    ///
    /// Depends on `amount` alone: the result replaces any earlier resolution.
    /// Entries that are not automatic are ignored.
    pub fn resolve_automatic(&self, amount: Amount, automatic: &[Promotion]) -> PromotionSet {
        automatic
            .iter()
            .filter(|p| p.is_automatic() && p.is_eligible(amount))
            .map(|p| (p.id, p.clone()))
            .collect()
    }

    /// Select or deselect a one-time promotion.
    ///
    /// Automatic promotions and promotions whose minimum spend exceeds
    /// `amount` are refused and the selection is returned unchanged.
    pub fn toggle_one_time(
        &self,
        promotion: &Promotion,
        current: &PromotionSelection,
        amount: Amount,
    ) -> ToggleOutcome {
        let rejection = if promotion.is_automatic() {
            Some(ToggleRejection::AutomaticPromotion)
        } else {
            promotion
                .min_spending
                .filter(|min| amount.value() < *min)
                .map(|min_spending| ToggleRejection::BelowMinimumSpend {
                    min_spending,
                    amount,
                })
        };

        if let Some(rejection) = rejection {
            metrics::counter!("pointpulse.promotions.toggle_rejected").increment(1);
            debug!(
                promotion_id = promotion.id,
                reason = %rejection,
                "Promotion toggle rejected"
            );
            return ToggleOutcome {
                selection: current.clone(),
                rejection: Some(rejection),
            };
        }

        let mut selection = current.clone();
        let selected = selection.flip_one_time(promotion);
        debug!(promotion_id = promotion.id, selected, "One-time promotion toggled");
        ToggleOutcome {
            selection,
            rejection: None,
        }
    }

    /// Re-derive the selection after an amount change: the automatic half is
    /// resolved afresh from `automatic`, one-time promotions that no longer
    /// meet their minimum spend are evicted.
    pub fn revalidate(
        &self,
        amount: Amount,
        current: &PromotionSelection,
        automatic: &[Promotion],
    ) -> RevalidateOutcome {
        let resolved = self.resolve_automatic(amount, automatic);

        let mut kept = PromotionSet::new();
        let mut evicted = Vec::new();
        for (id, promotion) in current.one_time() {
            if promotion.is_eligible(amount) {
                kept.insert(*id, promotion.clone());
            } else {
                evicted.push(promotion.clone());
            }
        }

        if !evicted.is_empty() {
            metrics::counter!("pointpulse.promotions.evicted").increment(evicted.len() as u64);
            info!(
                amount = %amount,
                evicted = evicted.len(),
                ids = ?evicted.iter().map(|p| p.id).collect::<Vec<_>>(),
                "One-time promotions evicted below minimum spend"
            );
        }

        RevalidateOutcome {
            selection: PromotionSelection::from_parts(resolved, kept),
            evicted,
        }
    }

    /// Points earned by a purchase of `amount` with `selection` applied.
    ///
    /// Base points are one per `cents_per_point` cents. Only the highest
    /// eligible rate contributes; fixed bonuses all add up.
    pub fn compute_points(&self, amount: Amount, selection: &PromotionSelection) -> PointsResult {
        let cents = amount.value().checked_mul(Decimal::ONE_HUNDRED);

        let base_points = cents
            .and_then(|c| c.checked_div(Decimal::from(self.config.cents_per_point)))
            .map_or(u64::MAX, round_points);

        let max_rate = selection
            .iter()
            .filter(|p| p.is_eligible(amount))
            .filter_map(|p| p.rate)
            .filter(|rate| *rate > Decimal::ZERO)
            .max();
        let bonus_from_rates = match max_rate {
            Some(rate) => cents
                .and_then(|c| c.checked_mul(rate))
                .map_or(u64::MAX, round_points),
            None => 0,
        };

        let bonus_from_fixed = selection
            .iter()
            .filter_map(|p| p.points)
            .fold(0u64, u64::saturating_add);

        let result = PointsResult::new(base_points, bonus_from_rates, bonus_from_fixed);
        debug!(
            amount = %amount,
            base = result.base_points,
            rates = result.bonus_from_rates,
            fixed = result.bonus_from_fixed,
            total = result.total,
            "Points computed"
        );
        result
    }
}

/// Round half away from zero to a whole number of points.
fn round_points(value: Decimal) -> u64 {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    if rounded <= Decimal::ZERO {
        0
    } else {
        rounded.to_u64().unwrap_or(u64::MAX)
    }
}
