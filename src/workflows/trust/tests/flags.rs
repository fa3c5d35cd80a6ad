use super::common::*;
use crate::workflows::trust::domain::{
    AlertKind, BuyerEvent, DisputeId, DisputeStanding, FlagContext, FlagSeverity, FlagStatus,
    FlagType, PaymentTiming, ReturnOutcome, SellerId, TransactionId,
};
use crate::workflows::trust::repository::TrustScoreRepository;

#[test]
fn manual_flag_lazily_scores_and_alerts() {
    let (service, store) = build_service();
    let id = buyer("buyer-1");
    store.record_transaction(&id, on_time_transaction("tx-1", 1_000.0));
    store.record_transaction(&id, on_time_transaction("tx-2", 1_000.0));
    store.record_transaction(
        &id,
        transaction(
            "tx-3",
            "seller-2",
            1_000.0,
            PaymentTiming::OnTime,
            ReturnOutcome::None,
        ),
    );

    let flag = service
        .create_risk_flag(
            &id,
            FlagType::PolicyViolation,
            FlagSeverity::Medium,
            "Listing terms breached",
            FlagContext::default(),
        )
        .expect("flag recorded");

    assert!(flag.flag_id.starts_with("flag-"));
    assert_eq!(flag.status, FlagStatus::Active);

    let score = store
        .score(&id)
        .expect("score readable")
        .expect("score row created lazily");
    assert!(score.last_flag_at.is_some());

    let alerts = store.alerts(&id).expect("alerts readable");
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::NewFlag);
    assert_eq!(alerts[0].severity, FlagSeverity::Medium);
    assert!(!alerts[0].admin_notified);
    // Two sellers transacted with the buyer; the audience is deduplicated.
    assert_eq!(
        alerts[0].seller_audience,
        vec![
            SellerId("seller-1".to_string()),
            SellerId("seller-2".to_string())
        ]
    );
}

#[test]
fn overdue_payment_within_policy_only_recalculates() {
    let (service, store) = build_service();
    let id = buyer("buyer-1");

    let flags = service
        .handle_event(
            &id,
            BuyerEvent::PaymentOverdue {
                transaction_id: TransactionId("tx-1".to_string()),
                days_overdue: 30,
            },
        )
        .expect("event handled");

    assert!(flags.is_empty());
    assert!(store.score(&id).expect("score readable").is_some());
    assert!(store.flags(&id).expect("flags readable").is_empty());
}

#[test]
fn overdue_payment_past_policy_raises_a_high_flag() {
    let (service, store) = build_service();
    let id = buyer("buyer-1");

    let flags = service
        .handle_event(
            &id,
            BuyerEvent::PaymentOverdue {
                transaction_id: TransactionId("tx-1".to_string()),
                days_overdue: 31,
            },
        )
        .expect("event handled");

    assert_eq!(flags.len(), 1);
    assert_eq!(flags[0].flag_type, FlagType::PaymentDelay);
    assert_eq!(flags[0].severity, FlagSeverity::High);
    assert_eq!(
        flags[0].context.transaction_id,
        Some(TransactionId("tx-1".to_string()))
    );

    let alerts = store.alerts(&id).expect("alerts readable");
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].admin_notified);
}

#[test]
fn first_chargeback_flags_without_fraud_escalation() {
    let (service, _) = build_service();
    let id = buyer("buyer-1");

    let flags = service
        .handle_event(
            &id,
            BuyerEvent::Chargeback {
                transaction_id: TransactionId("tx-1".to_string()),
            },
        )
        .expect("event handled");

    assert_eq!(flags.len(), 1);
    assert_eq!(flags[0].flag_type, FlagType::Chargeback);
    assert_eq!(flags[0].severity, FlagSeverity::Critical);
}

#[test]
fn repeated_chargebacks_escalate_to_fraud_suspicion() {
    let (service, store) = build_service();
    let id = buyer("buyer-1");
    store.record_dispute(&id, dispute("d-1", DisputeStanding::ResolvedSellerFavor, true));
    store.record_dispute(&id, dispute("d-2", DisputeStanding::ResolvedSellerFavor, true));
    // Track the prior chargebacks on the score row before the new event.
    service.recalculate(&id).expect("baseline");

    let flags = service
        .handle_event(
            &id,
            BuyerEvent::Chargeback {
                transaction_id: TransactionId("tx-9".to_string()),
            },
        )
        .expect("event handled");

    assert_eq!(flags.len(), 2);
    assert_eq!(flags[0].flag_type, FlagType::Chargeback);
    assert_eq!(flags[1].flag_type, FlagType::FraudSuspicion);
    assert_eq!(flags[1].severity, FlagSeverity::Critical);
}

#[test]
fn dispute_burst_inside_the_window_raises_a_rate_flag() {
    let (service, store) = build_service();
    let id = buyer("buyer-1");
    for index in 0..4 {
        store.record_dispute(&id, aged_dispute(&format!("d-{index}"), index));
    }

    let flags = service
        .handle_event(
            &id,
            BuyerEvent::DisputeCreated {
                dispute_id: DisputeId("d-new".to_string()),
            },
        )
        .expect("event handled");

    assert_eq!(flags.len(), 1);
    assert_eq!(flags[0].flag_type, FlagType::HighDisputeRate);
    assert_eq!(flags[0].severity, FlagSeverity::High);
    assert_eq!(
        flags[0].context.dispute_id,
        Some(DisputeId("d-new".to_string()))
    );
}

#[test]
fn exactly_three_recent_disputes_stay_below_the_rate_trigger() {
    let (service, store) = build_service();
    let id = buyer("buyer-1");
    // The rate flag needs more than three disputes inside the window.
    for index in 0..3 {
        store.record_dispute(&id, aged_dispute(&format!("d-{index}"), index));
    }

    let flags = service
        .handle_event(
            &id,
            BuyerEvent::DisputeCreated {
                dispute_id: DisputeId("d-new".to_string()),
            },
        )
        .expect("event handled");

    assert!(flags.is_empty());
    assert!(store.flags(&id).expect("flags readable").is_empty());
}

#[test]
fn old_disputes_fall_out_of_the_rate_window() {
    let (service, store) = build_service();
    let id = buyer("buyer-1");
    store.record_dispute(&id, aged_dispute("d-1", 2));
    store.record_dispute(&id, aged_dispute("d-2", 5));
    store.record_dispute(&id, aged_dispute("d-old-1", 40));
    store.record_dispute(&id, aged_dispute("d-old-2", 45));

    let flags = service
        .handle_event(
            &id,
            BuyerEvent::DisputeCreated {
                dispute_id: DisputeId("d-new".to_string()),
            },
        )
        .expect("event handled");

    assert!(flags.is_empty());
    assert!(store.score(&id).expect("score readable").is_some());
}
