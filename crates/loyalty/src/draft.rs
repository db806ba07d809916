//! Purchase draft as a pure reducer: `(draft, event) -> draft`.
//!
//! A cashier form feeds `AmountChanged` on every keystroke and `Toggled`
//! on every promotion click; the reducer keeps the selection valid and
//! hands back at most one notice per event.

use pointpulse_core::promotion::{Amount, PointsResult, Promotion, PromotionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::PromotionEngine;
use crate::selection::{PromotionSelection, RevalidateOutcome, ToggleRejection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftEvent {
    AmountChanged(Amount),
    Toggled(Promotion),
}

/// User-facing message produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftNotice {
    /// One aggregated notice per eviction batch.
    PromotionsEvicted { count: usize, message: String },
    ToggleRejected {
        promotion_id: PromotionId,
        reason: ToggleRejection,
    },
}

impl std::fmt::Display for DraftNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DraftNotice::PromotionsEvicted { message, .. } => f.write_str(message),
            DraftNotice::ToggleRejected { reason, .. } => write!(f, "{}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftTransition {
    pub draft: PurchaseDraft,
    pub notice: Option<DraftNotice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseDraft {
    amount: Amount,
    automatic_catalog: Vec<Promotion>,
    selection: PromotionSelection,
}

impl PurchaseDraft {
    /// A draft at amount zero, with automatic promotions that need no
    /// minimum spend already applied.
    pub fn new(engine: &PromotionEngine, automatic_catalog: Vec<Promotion>) -> Self {
        let automatic_catalog: Vec<Promotion> = automatic_catalog
            .into_iter()
            .filter(Promotion::is_automatic)
            .collect();
        let selection = engine
            .revalidate(Amount::ZERO, &PromotionSelection::new(), &automatic_catalog)
            .selection;
        Self {
            amount: Amount::ZERO,
            automatic_catalog,
            selection,
        }
    }

    /// Restore one-time promotions picked earlier; they are revalidated
    /// against the current amount right away.
    pub fn with_previous_selection(
        self,
        engine: &PromotionEngine,
        one_time: impl IntoIterator<Item = Promotion>,
    ) -> DraftTransition {
        let seeded = PromotionSelection::with_one_time(one_time);
        let outcome = engine.revalidate(self.amount, &seeded, &self.automatic_catalog);
        let notice = eviction_notice(&outcome);
        DraftTransition {
            draft: Self {
                selection: outcome.selection,
                ..self
            },
            notice,
        }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn selection(&self) -> &PromotionSelection {
        &self.selection
    }

    pub fn automatic_catalog(&self) -> &[Promotion] {
        &self.automatic_catalog
    }

    pub fn reduce(&self, engine: &PromotionEngine, event: DraftEvent) -> DraftTransition {
        match event {
            DraftEvent::AmountChanged(amount) => {
                let outcome = engine.revalidate(amount, &self.selection, &self.automatic_catalog);
                let notice = eviction_notice(&outcome);
                DraftTransition {
                    draft: Self {
                        amount,
                        automatic_catalog: self.automatic_catalog.clone(),
                        selection: outcome.selection,
                    },
                    notice,
                }
            }
            DraftEvent::Toggled(promotion) => {
                let outcome = engine.toggle_one_time(&promotion, &self.selection, self.amount);
                let notice = outcome.rejection.map(|reason| DraftNotice::ToggleRejected {
                    promotion_id: promotion.id,
                    reason,
                });
                DraftTransition {
                    draft: Self {
                        amount: self.amount,
                        automatic_catalog: self.automatic_catalog.clone(),
                        selection: outcome.selection,
                    },
                    notice,
                }
            }
        }
    }

    /// Advisory preview; the transaction endpoint's `earned` is final.
    pub fn points(&self, engine: &PromotionEngine) -> PointsResult {
        engine.compute_points(self.amount, &self.selection)
    }

    pub fn to_request(&self, utorid: &str, remark: Option<&str>) -> PurchaseRequest {
        PurchaseRequest {
            utorid: utorid.trim().to_string(),
            kind: PurchaseRequest::KIND.to_string(),
            spent: self.amount.value(),
            promotion_ids: self.selection.promotion_ids(),
            remark: remark
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
        }
    }
}

fn eviction_notice(outcome: &RevalidateOutcome) -> Option<DraftNotice> {
    outcome.notice().map(|message| DraftNotice::PromotionsEvicted {
        count: outcome.evicted_count(),
        message,
    })
}

// ─── Transaction Request ────────────────────────────────────────────────────

/// Body of the purchase transaction-creation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub utorid: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub spent: Decimal,
    pub promotion_ids: Vec<PromotionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl PurchaseRequest {
    pub const KIND: &'static str = "purchase";
}
