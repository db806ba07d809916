//! PointPulse promotion engine: which promotions apply to a purchase and
//! how many points it earns.

pub mod catalog;
pub mod draft;
pub mod engine;
pub mod selection;

pub use draft::{DraftEvent, DraftNotice, DraftTransition, PurchaseDraft, PurchaseRequest};
pub use engine::PromotionEngine;
pub use selection::{PromotionSelection, RevalidateOutcome, ToggleOutcome, ToggleRejection};
