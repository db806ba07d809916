//! Promotion selection state for a purchase draft and the outcomes of the
//! engine's transitions over it.

use pointpulse_core::promotion::{Amount, Promotion, PromotionId, PromotionSet};
use rust_decimal::Decimal;

/// Promotions applied to a purchase draft.
///
/// The automatic half is re-derived from the amount on every change; the
/// one-time half only changes through user toggles and revalidation. The two
/// halves never share an id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromotionSelection {
    automatic: PromotionSet,
    one_time: PromotionSet,
}

impl PromotionSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a selection with one-time promotions picked earlier, e.g.
    /// restored from a saved draft. Automatic entries are ignored; run
    /// `revalidate` before trusting eligibility.
    pub fn with_one_time(promotions: impl IntoIterator<Item = Promotion>) -> Self {
        Self {
            automatic: PromotionSet::new(),
            one_time: promotions
                .into_iter()
                .filter(Promotion::is_one_time)
                .map(|p| (p.id, p))
                .collect(),
        }
    }

    pub(crate) fn from_parts(automatic: PromotionSet, one_time: PromotionSet) -> Self {
        Self {
            automatic,
            one_time,
        }
    }

    pub fn automatic(&self) -> &PromotionSet {
        &self.automatic
    }

    pub fn one_time(&self) -> &PromotionSet {
        &self.one_time
    }

    pub fn contains(&self, id: PromotionId) -> bool {
        self.automatic.contains_key(&id) || self.one_time.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Promotion> {
        self.automatic.values().chain(self.one_time.values())
    }

    pub fn len(&self) -> usize {
        self.automatic.len() + self.one_time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.automatic.is_empty() && self.one_time.is_empty()
    }

    /// Ids of every selected promotion, ascending.
    pub fn promotion_ids(&self) -> Vec<PromotionId> {
        let mut ids: Vec<PromotionId> = self
            .automatic
            .keys()
            .chain(self.one_time.keys())
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Add or remove a one-time promotion. Returns whether it is now
    /// selected.
    pub(crate) fn flip_one_time(&mut self, promotion: &Promotion) -> bool {
        if self.one_time.remove(&promotion.id).is_some() {
            false
        } else {
            self.one_time.insert(promotion.id, promotion.clone());
            true
        }
    }
}

// ─── Toggle ─────────────────────────────────────────────────────────────────

/// Why a toggle was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleRejection {
    /// Automatic promotions follow the amount, not the user.
    AutomaticPromotion,
    BelowMinimumSpend { min_spending: Decimal, amount: Amount },
}

impl std::fmt::Display for ToggleRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToggleRejection::AutomaticPromotion => {
                f.write_str("Automatic promotions are applied based on the purchase amount")
            }
            ToggleRejection::BelowMinimumSpend {
                min_spending,
                amount,
            } => write!(
                f,
                "Requires a minimum spend of ${:.2}, purchase is {}",
                min_spending, amount
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub selection: PromotionSelection,
    pub rejection: Option<ToggleRejection>,
}

impl ToggleOutcome {
    pub fn rejected(&self) -> bool {
        self.rejection.is_some()
    }
}

// ─── Revalidate ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevalidateOutcome {
    pub selection: PromotionSelection,
    /// One-time promotions dropped because the amount fell below their
    /// minimum spend, in id order.
    pub evicted: Vec<Promotion>,
}

impl RevalidateOutcome {
    pub fn evicted_count(&self) -> usize {
        self.evicted.len()
    }

    /// A single message for the whole eviction batch.
    pub fn notice(&self) -> Option<String> {
        match self.evicted.len() {
            0 => None,
            1 => Some(format!(
                "{} was removed because the purchase amount is below its minimum spending",
                self.evicted[0].display_name()
            )),
            n => Some(format!(
                "{} promotions were removed because the purchase amount is below their minimum spending",
                n
            )),
        }
    }
}
