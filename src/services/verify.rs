use {
    crate::domain::{
        donation::{DonationIntent, GatewayReference, TerminalStatus},
        error::DonationError,
        gateway::PaymentGateway,
        ledger::Ledger,
        notifier::Notifier,
    },
    crate::services::reconcile::{ReconcileOutcome, TerminalObservation, reconcile},
    std::sync::Arc,
};

#[derive(Debug)]
pub struct VerificationResult {
    pub intent: DonationIntent,
    pub outcome: ReconcileOutcome,
    /// Raw gateway payload, returned to the caller verbatim.
    pub gateway_payload: serde_json::Value,
}

/// Client-triggered verification pull: ask the gateway for the
/// authoritative charge status and feed it through the same reconcile call
/// the webhook uses, so the two channels cannot diverge.
pub async fn verify(
    ledger: &dyn Ledger,
    gateway: &dyn PaymentGateway,
    notifier: Arc<dyn Notifier>,
    reference: &GatewayReference,
) -> Result<VerificationResult, DonationError> {
    let observation = gateway.query_status(reference).await?;

    let intent = ledger
        .find_by_reference(reference)
        .await?
        .ok_or_else(|| DonationError::NotFound(format!("no donation for reference {reference}")))?;

    let outcome = match TerminalStatus::from_gateway(&observation.status) {
        Some(status) => {
            reconcile(
                ledger,
                notifier,
                &intent,
                TerminalObservation {
                    status,
                    raw_payload: observation.raw_payload.clone(),
                },
            )
            .await?
        }
        // Charge still in flight on the gateway side: nothing definitive
        // to record, the intent stays PENDING.
        None => {
            tracing::info!(
                donation_id = %intent.id(),
                gateway_status = %observation.status,
                "charge not yet definitive, leaving intent PENDING"
            );
            ReconcileOutcome {
                applied: false,
                final_status: intent.status(),
            }
        }
    };

    Ok(VerificationResult {
        intent,
        outcome,
        gateway_payload: observation.raw_payload,
    })
}
