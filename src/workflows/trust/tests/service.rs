use std::sync::Arc;

use super::common::*;
use crate::workflows::trust::domain::{
    AlertKind, ComplianceSnapshot, DisputeStanding, FlagSeverity, PaymentTiming, ReturnOutcome,
    RiskLevel, ScoreChangeReason,
};
use crate::workflows::trust::memory::InMemoryTrustStore;
use crate::workflows::trust::metrics::MetricAggregator;
use crate::workflows::trust::repository::{RepositoryError, TrustScoreRepository};
use crate::workflows::trust::{TrustScoreService, TrustServiceError};

#[test]
fn first_recalculation_starts_from_the_neutral_prior() {
    let (service, store) = build_service();
    let id = buyer("buyer-1");

    let score = service.recalculate(&id).expect("recalculation succeeds");

    assert_eq!(score.overall_score, 61);
    assert_eq!(score.risk_level, RiskLevel::Medium);
    assert_eq!(score.score_version, 1);

    let history = store.history(&id).expect("history readable");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].previous_score, 50);
    assert_eq!(history[0].new_score, 61);
    assert_eq!(history[0].delta, 11);
    assert_eq!(history[0].reason, ScoreChangeReason::Recalculation);
}

#[test]
fn recalculation_with_identical_inputs_appends_no_history() {
    let (service, store) = build_service();
    let id = buyer("buyer-1");

    service.recalculate(&id).expect("first run");
    let second = service.recalculate(&id).expect("second run");

    // The version still bumps so concurrent writers are detected, but the
    // unchanged score is not ledgered again.
    assert_eq!(second.score_version, 2);
    assert_eq!(store.history(&id).expect("history").len(), 1);
    assert!(store.alerts(&id).expect("alerts").is_empty());
}

#[test]
fn aggregator_reduces_raw_activity_records() {
    let store = Arc::new(InMemoryTrustStore::default());
    let id = buyer("buyer-1");

    for index in 0..3 {
        store.record_transaction(&id, on_time_transaction(&format!("tx-{index}"), 10_000.0));
    }
    store.record_transaction(
        &id,
        transaction(
            "tx-late",
            "seller-2",
            5_000.0,
            PaymentTiming::Late,
            ReturnOutcome::Reasonable,
        ),
    );
    store.record_transaction(
        &id,
        transaction(
            "tx-open",
            "seller-2",
            2_500.0,
            PaymentTiming::Outstanding,
            ReturnOutcome::Unreasonable,
        ),
    );
    store.record_dispute(&id, dispute("d-1", DisputeStanding::Open, true));
    store.record_dispute(&id, dispute("d-2", DisputeStanding::ResolvedSellerFavor, false));
    store.record_review(&id, review(true, false));
    store.record_review(&id, review(true, false));
    store.record_review(&id, review(false, true));
    store.set_compliance_snapshot(
        &id,
        ComplianceSnapshot {
            kyb_verified: true,
            missing_documentation_count: 1,
            ..ComplianceSnapshot::default()
        },
    );

    let metrics = MetricAggregator::new(store).aggregate(&id).expect("aggregate");

    assert_eq!(metrics.total_transactions, 5);
    assert_eq!(metrics.total_purchased, 37_500.0);
    // The outstanding transaction is excluded from the on-time denominator.
    assert_eq!(metrics.on_time_payment_pct, 75.0);
    assert_eq!(metrics.late_payment_count, 1);
    assert_eq!(metrics.return_rate_pct, 40.0);
    assert_eq!(metrics.unreasonable_return_count, 1);
    assert_eq!(metrics.total_disputes, 2);
    assert_eq!(metrics.open_disputes, 1);
    assert_eq!(metrics.resolved_disputes, 1);
    assert_eq!(metrics.chargeback_count, 1);
    assert_eq!(metrics.chargeback_rate_pct, 20.0);
    assert_eq!(metrics.seller_win_rate_pct, 100.0);
    assert!((metrics.positive_review_ratio - 2.0 / 3.0).abs() < f64::EPSILON);
    assert_eq!(metrics.communication_issue_count, 1);
    assert!(metrics.kyb_verified);
    assert_eq!(metrics.missing_documentation_count, 1);
}

#[test]
fn model_buyer_reaches_low_risk() {
    let (service, store) = build_service();
    let id = buyer("buyer-1");
    seed_model_buyer(&store, &id);

    let score = service.recalculate(&id).expect("recalculation succeeds");

    assert_eq!(score.overall_score, 77);
    assert_eq!(score.risk_level, RiskLevel::Low);
    assert_eq!(score.counters.total_transactions, 10);
    assert_eq!(score.risk_category, None);
}

#[test]
fn sharp_score_drop_raises_a_high_severity_alert() {
    let (service, store) = build_service();
    let id = buyer("buyer-1");
    service.recalculate(&id).expect("baseline at 61");

    store.set_compliance_snapshot(
        &id,
        ComplianceSnapshot {
            sanctions_flag_count: 1,
            ..ComplianceSnapshot::default()
        },
    );
    for _ in 0..25 {
        store.record_review(&id, review(false, true));
    }

    let score = service.recalculate(&id).expect("recalculation succeeds");

    assert_eq!(score.overall_score, 46);
    let alerts = store.alerts(&id).expect("alerts readable");
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::ScoreDrop);
    assert_eq!(alerts[0].severity, FlagSeverity::High);
    assert!(alerts[0].admin_notified);
    assert!(alerts[0].title.contains("15"));
}

#[test]
fn drop_below_the_threshold_stays_silent() {
    let (service, store) = build_service();
    let id = buyer("buyer-1");
    service.recalculate(&id).expect("baseline at 61");

    store.set_compliance_snapshot(
        &id,
        ComplianceSnapshot {
            sanctions_flag_count: 2,
            ..ComplianceSnapshot::default()
        },
    );
    for _ in 0..15 {
        store.record_review(&id, review(false, true));
    }

    let score = service.recalculate(&id).expect("recalculation succeeds");

    // A 14-point drop sits one point inside the alert threshold.
    assert_eq!(score.overall_score, 47);
    assert!(store.alerts(&id).expect("alerts").is_empty());
    assert_eq!(store.history(&id).expect("history").len(), 2);
}

#[test]
fn version_races_retry_and_then_succeed() {
    let source = Arc::new(InMemoryTrustStore::default());
    let repository = Arc::new(ContestedStore::conflicting(1));
    let service = TrustScoreService::new(source, repository.clone());
    let id = buyer("buyer-1");

    let score = service.recalculate(&id).expect("retry wins the race");

    assert_eq!(score.score_version, 1);
    assert!(repository.score(&id).expect("score readable").is_some());
}

#[test]
fn exhausted_retries_surface_contention() {
    let source = Arc::new(InMemoryTrustStore::default());
    let repository = Arc::new(ContestedStore::conflicting(usize::MAX));
    let service = TrustScoreService::new(source, repository);
    let id = buyer("buyer-1");

    match service.recalculate(&id) {
        Err(TrustServiceError::Contention(contested)) => assert_eq!(contested, id.0),
        other => panic!("expected contention, got {other:?}"),
    }
}

#[test]
fn get_propagates_not_found() {
    let (service, _) = build_service();

    match service.get(&buyer("missing")) {
        Err(TrustServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}
