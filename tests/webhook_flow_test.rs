mod common;

use common::*;
use donation_ledger::adapters::webhook::{WebhookOutcome, process_event};
use donation_ledger::domain::donation::DonationStatus;
use donation_ledger::domain::error::DonationError;
use donation_ledger::infra::memory::MemoryLedger;
use donation_ledger::services::verify;
use std::sync::Arc;

// The end-to-end happy path: ₦5,000 intent, webhook lands first, verify
// confirms without re-notifying, duplicate webhook no-ops.
#[tokio::test]
async fn webhook_then_verify_then_duplicate_webhook() {
    let ledger = MemoryLedger::new();
    let gateway = FakeGateway::new("R1");
    let notifier = Arc::new(CountingNotifier::new());

    let (intent, reference) = pending_intent(&ledger, &gateway, 500_000).await;
    assert_eq!(reference.as_str(), "R1");

    let body = charge_success_body("R1");
    let outcome = process_event(&ledger, notifier.clone(), &body)
        .await
        .unwrap();
    match outcome {
        WebhookOutcome::Reconciled(outcome) => {
            assert!(outcome.applied);
            assert_eq!(outcome.final_status, DonationStatus::Success);
        }
        other => panic!("unexpected: {other:?}"),
    }

    // Post-redirect browser pulls verification; status is already set.
    let result = verify::verify(&ledger, &gateway, notifier.clone(), &reference)
        .await
        .unwrap();
    assert!(!result.outcome.applied);
    assert_eq!(result.outcome.final_status, DonationStatus::Success);

    // The gateway redelivers the same webhook.
    let outcome = process_event(&ledger, notifier.clone(), &body)
        .await
        .unwrap();
    match outcome {
        WebhookOutcome::Reconciled(outcome) => {
            assert!(!outcome.applied);
            assert_eq!(outcome.final_status, DonationStatus::Success);
        }
        other => panic!("unexpected: {other:?}"),
    }

    assert_eq!(status_of(&ledger, intent.id()).await, DonationStatus::Success);
    drain_notifications().await;
    assert_eq!(notifier.count(), 1, "verify and redelivery must not re-notify");
}

#[tokio::test]
async fn unknown_reference_is_acked_without_state_change() {
    let ledger = MemoryLedger::new();
    let notifier = Arc::new(CountingNotifier::new());

    let body = charge_success_body("trx_nobody_knows");
    let outcome = process_event(&ledger, notifier.clone(), &body)
        .await
        .unwrap();
    assert!(matches!(outcome, WebhookOutcome::UnknownReference));

    drain_notifications().await;
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn non_actionable_events_are_ignored() {
    let ledger = MemoryLedger::new();
    let gateway = FakeGateway::new("trx_other");
    let notifier = Arc::new(CountingNotifier::new());

    let (intent, reference) = pending_intent(&ledger, &gateway, 200_000).await;

    let body = serde_json::json!({
        "event": "transfer.success",
        "data": { "reference": reference.as_str() },
    })
    .to_string()
    .into_bytes();

    let outcome = process_event(&ledger, notifier.clone(), &body)
        .await
        .unwrap();
    assert!(matches!(outcome, WebhookOutcome::Ignored));
    assert_eq!(status_of(&ledger, intent.id()).await, DonationStatus::Pending);
}

#[tokio::test]
async fn malformed_payload_is_acked_not_errored() {
    let ledger = MemoryLedger::new();
    let notifier = Arc::new(CountingNotifier::new());

    let outcome = process_event(&ledger, notifier, b"not json at all")
        .await
        .unwrap();
    assert!(matches!(outcome, WebhookOutcome::Ignored));
}

#[tokio::test]
async fn verify_with_unknown_reference_is_not_found() {
    let ledger = MemoryLedger::new();
    let gateway = FakeGateway::new("trx_v_unknown");
    let notifier = Arc::new(CountingNotifier::new());

    // Gateway knows the charge, the ledger does not.
    let reference =
        donation_ledger::domain::donation::GatewayReference::new("trx_v_unknown").unwrap();
    let err = verify::verify(&ledger, &gateway, notifier, &reference)
        .await
        .unwrap_err();
    assert!(matches!(err, DonationError::NotFound(_)));
}

#[tokio::test]
async fn verify_with_in_flight_charge_leaves_intent_pending() {
    let ledger = MemoryLedger::new();
    let gateway = FakeGateway::new("trx_inflight");
    let notifier = Arc::new(CountingNotifier::new());

    let (intent, reference) = pending_intent(&ledger, &gateway, 180_000).await;
    gateway.set_verify_status("ongoing");

    let result = verify::verify(&ledger, &gateway, notifier.clone(), &reference)
        .await
        .unwrap();
    assert!(!result.outcome.applied);
    assert_eq!(result.outcome.final_status, DonationStatus::Pending);
    assert_eq!(status_of(&ledger, intent.id()).await, DonationStatus::Pending);
}

#[tokio::test]
async fn verify_with_failed_charge_settles_failed() {
    let ledger = MemoryLedger::new();
    let gateway = FakeGateway::new("trx_failed");
    let notifier = Arc::new(CountingNotifier::new());

    let (intent, reference) = pending_intent(&ledger, &gateway, 220_000).await;
    gateway.set_verify_status("abandoned");

    let result = verify::verify(&ledger, &gateway, notifier.clone(), &reference)
        .await
        .unwrap();
    assert!(result.outcome.applied);
    assert_eq!(result.outcome.final_status, DonationStatus::Failed);
    assert_eq!(status_of(&ledger, intent.id()).await, DonationStatus::Failed);

    drain_notifications().await;
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn rejected_verification_mutates_nothing() {
    let ledger = MemoryLedger::new();
    let gateway = FakeGateway::new("trx_rejected");
    let notifier = Arc::new(CountingNotifier::new());

    let (intent, reference) = pending_intent(&ledger, &gateway, 130_000).await;
    gateway.reject_verify();

    let err = verify::verify(&ledger, &gateway, notifier, &reference)
        .await
        .unwrap_err();
    assert!(matches!(err, DonationError::GatewayRejected(_)));
    assert_eq!(status_of(&ledger, intent.id()).await, DonationStatus::Pending);
}
