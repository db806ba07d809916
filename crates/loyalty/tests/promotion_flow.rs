//! End-to-end promotion selection and points preview for a cashier purchase.

use pointpulse_core::promotion::{Amount, Promotion};
use pointpulse_loyalty::catalog::{active_promotions, automatic_only, parse_catalog};
use pointpulse_loyalty::{DraftEvent, DraftNotice, PromotionEngine, PromotionSelection, PurchaseDraft};
use rust_decimal_macros::dec;

const LISTING: &str = r#"[
    {"id": 10, "name": "Spend $50, get 100", "type": "automatic", "minSpending": 50, "points": 100},
    {"id": 11, "name": "Campus week", "type": "automatic", "rate": 0.01},
    {"id": 12, "name": "Expired", "type": "automatic", "points": 999,
     "startTime": "2020-01-01T00:00:00Z", "endTime": "2020-01-02T00:00:00Z"},
    {"id": 20, "name": "Welcome", "type": "one-time", "minSpending": 50, "points": 20},
    {"id": 21, "name": "Double rate", "type": "one-time", "rate": 0.02}
]"#;

fn listing() -> Vec<Promotion> {
    parse_catalog(LISTING).unwrap()
}

fn by_id(id: u64) -> Promotion {
    listing().into_iter().find(|p| p.id == id).unwrap()
}

fn draft(engine: &PromotionEngine) -> PurchaseDraft {
    let now = chrono::Utc::now();
    PurchaseDraft::new(engine, automatic_only(&active_promotions(&listing(), now)))
}

#[test]
fn expired_promotions_never_apply() {
    let engine = PromotionEngine::default();
    let draft = draft(&engine)
        .reduce(&engine, DraftEvent::AmountChanged(Amount::new(dec!(100))))
        .draft;
    assert!(!draft.selection().contains(12));
    assert_eq!(draft.selection().promotion_ids(), vec![10, 11]);
}

#[test]
fn sixty_dollar_purchase_preview() {
    let engine = PromotionEngine::default();
    let draft = draft(&engine)
        .reduce(&engine, DraftEvent::AmountChanged(Amount::new(dec!(60))))
        .draft;
    let points = draft.points(&engine);
    assert_eq!(points.base_points, 240);
    assert_eq!(points.bonus_from_fixed, 100);
    assert_eq!(points.bonus_from_rates, 60);
    assert_eq!(points.total, 400);
}

#[test]
fn highest_rate_wins_when_one_time_rate_added() {
    let engine = PromotionEngine::default();
    let draft = draft(&engine)
        .reduce(&engine, DraftEvent::AmountChanged(Amount::new(dec!(25))))
        .draft
        .reduce(&engine, DraftEvent::Toggled(by_id(21)))
        .draft;
    let points = draft.points(&engine);
    assert_eq!(points.bonus_from_rates, 50);
    assert_eq!(points.total, 150);
}

#[test]
fn toggle_below_minimum_is_rejected_without_change() {
    let engine = PromotionEngine::default();
    let draft = draft(&engine)
        .reduce(&engine, DraftEvent::AmountChanged(Amount::new(dec!(10))))
        .draft;
    let outcome = engine.toggle_one_time(&by_id(20), draft.selection(), draft.amount());
    assert!(outcome.rejected());
    assert_eq!(&outcome.selection, draft.selection());
}

#[test]
fn automatic_promotions_cannot_be_toggled() {
    let engine = PromotionEngine::default();
    let outcome = engine.toggle_one_time(&by_id(11), &PromotionSelection::new(), Amount::new(dec!(10)));
    assert!(outcome.rejected());
    assert!(outcome.selection.is_empty());
}

#[test]
fn lowering_amount_evicts_with_single_notice() {
    let engine = PromotionEngine::default();
    let draft = draft(&engine)
        .reduce(&engine, DraftEvent::AmountChanged(Amount::new(dec!(80))))
        .draft
        .reduce(&engine, DraftEvent::Toggled(by_id(20)))
        .draft
        .reduce(&engine, DraftEvent::Toggled(by_id(21)))
        .draft;
    assert_eq!(draft.selection().promotion_ids(), vec![10, 11, 20, 21]);

    let step = draft.reduce(&engine, DraftEvent::AmountChanged(Amount::new(dec!(20))));
    match &step.notice {
        Some(DraftNotice::PromotionsEvicted { count, message }) => {
            assert_eq!(*count, 1);
            assert!(message.contains("Welcome"));
        }
        other => panic!("expected eviction notice, got {:?}", other),
    }
    assert_eq!(step.draft.selection().promotion_ids(), vec![11, 21]);

    let again = step
        .draft
        .reduce(&engine, DraftEvent::AmountChanged(Amount::new(dec!(20))));
    assert_eq!(again.notice, None);
    assert_eq!(again.draft, step.draft);
}

#[test]
fn revalidate_is_idempotent() {
    let engine = PromotionEngine::default();
    let automatic = automatic_only(&listing());
    let selection = PromotionSelection::with_one_time(vec![by_id(20), by_id(21)]);
    for value in [dec!(0), dec!(10), dec!(49.99), dec!(50), dec!(500)] {
        let amount = Amount::new(value);
        let first = engine.revalidate(amount, &selection, &automatic);
        let second = engine.revalidate(amount, &first.selection, &automatic);
        assert_eq!(second.evicted_count(), 0);
        assert_eq!(second.selection, first.selection);
    }
}

#[test]
fn resolve_automatic_is_deterministic() {
    let engine = PromotionEngine::default();
    let automatic = automatic_only(&listing());
    for value in [dec!(0), dec!(49.99), dec!(50), dec!(1000)] {
        let amount = Amount::new(value);
        assert_eq!(
            engine.resolve_automatic(amount, &automatic),
            engine.resolve_automatic(amount, &automatic)
        );
    }
}

#[test]
fn purchase_request_matches_selection() {
    let engine = PromotionEngine::default();
    let draft = draft(&engine)
        .reduce(&engine, DraftEvent::AmountChanged(Amount::parse_lossy("$60")))
        .draft;
    let request = draft.to_request("alice99", Some("Coffee and a bagel"));
    assert_eq!(request.promotion_ids, vec![10, 11]);
    assert_eq!(request.spent, dec!(60));
    assert_eq!(draft.points(&engine).reconcile(400), 400);
}
