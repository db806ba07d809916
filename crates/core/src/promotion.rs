//! Promotion and points domain types.
//!
//! Promotions arrive from the listing API in camelCase JSON:
//! - `automatic` promotions apply whenever the purchase meets `minSpending`
//! - `one-time` promotions must be picked by the user and are consumed
//!   server-side once used
//! - a promotion rewards a `rate` bonus, a fixed `points` bonus, or both

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

pub type PromotionId = u64;

/// Selected or resolved promotions keyed by id, iterated in id order.
pub type PromotionSet = BTreeMap<PromotionId, Promotion>;

// ─── Amount ─────────────────────────────────────────────────────────────────

/// A purchase amount in dollars.
///
/// Always non-negative: negative, NaN, infinite and unparsable inputs
/// collapse to zero so the engine never has to reject a number. Whether a
/// zero amount is a valid purchase is the caller's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        if value.is_sign_negative() || value.is_zero() {
            Self::ZERO
        } else {
            Self(value)
        }
    }

    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() || value <= 0.0 {
            return Self::ZERO;
        }
        Decimal::from_f64(value).map(Self::new).unwrap_or(Self::ZERO)
    }

    /// Parse form input such as `"60"`, `" 12.50 "` or `"$4.75"`.
    pub fn parse_lossy(raw: &str) -> Self {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed);
        trimmed
            .trim()
            .parse::<Decimal>()
            .map(Self::new)
            .unwrap_or(Self::ZERO)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_valid_purchase(&self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

// ─── Promotions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PromotionType {
    Automatic,
    OneTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub id: PromotionId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PromotionType,
    /// Minimum purchase amount, in dollars, for the promotion to apply.
    pub min_spending: Option<Decimal>,
    /// Extra points per cent spent (0.01 = one extra point per dollar).
    pub rate: Option<Decimal>,
    /// Fixed bonus points.
    pub points: Option<u64>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl Promotion {
    pub fn is_automatic(&self) -> bool {
        self.kind == PromotionType::Automatic
    }

    pub fn is_one_time(&self) -> bool {
        self.kind == PromotionType::OneTime
    }

    /// Whether `amount` meets the minimum spend (unset means always).
    pub fn is_eligible(&self, amount: Amount) -> bool {
        self.min_spending
            .map_or(true, |min| amount.value() >= min)
    }

    pub fn has_reward(&self) -> bool {
        self.rate.is_some() || self.points.is_some()
    }

    /// Whether `now` falls inside the promotion's window. Open ends are
    /// unbounded.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        let started = self.start_time.map_or(true, |start| start <= now);
        let not_ended = self.end_time.map_or(true, |end| now <= end);
        started && not_ended
    }

    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            format!("Promotion #{}", self.id)
        } else {
            self.name.clone()
        }
    }
}

// ─── Points ─────────────────────────────────────────────────────────────────

/// Breakdown of the points a purchase earns.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PointsResult {
    pub base_points: u64,
    pub bonus_from_rates: u64,
    pub bonus_from_fixed: u64,
    pub total: u64,
}

impl PointsResult {
    pub fn new(base_points: u64, bonus_from_rates: u64, bonus_from_fixed: u64) -> Self {
        Self {
            base_points,
            bonus_from_rates,
            bonus_from_fixed,
            total: base_points
                .saturating_add(bonus_from_rates)
                .saturating_add(bonus_from_fixed),
        }
    }

    /// Settle the preview against the `earned` figure returned by the
    /// transaction endpoint. The server figure is authoritative.
    pub fn reconcile(&self, server_earned: u64) -> u64 {
        if server_earned != self.total {
            warn!(
                preview = self.total,
                server = server_earned,
                "Points preview disagrees with server"
            );
        }
        server_earned
    }
}
