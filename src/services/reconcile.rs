use {
    crate::domain::{
        donation::{DonationIntent, DonationStatus, TerminalStatus},
        error::DonationError,
        ledger::Ledger,
        notifier::Notifier,
    },
    std::sync::Arc,
};

/// A definitive outcome observed on one of the confirmation channels,
/// ready to be recorded: webhook push, verify pull, or the sweeper's
/// synthetic abandonment.
#[derive(Debug, Clone)]
pub struct TerminalObservation {
    pub status: TerminalStatus,
    pub raw_payload: serde_json::Value,
}

impl TerminalObservation {
    /// The sweeper's observation for an abandoned intent.
    pub fn abandoned() -> Self {
        Self {
            status: TerminalStatus::Cancelled,
            raw_payload: serde_json::json!({ "reason": "expired_pending" }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Whether this call won the conditional write. `false` means the row
    /// was already terminal — a normal no-op, not an error.
    pub applied: bool,
    pub final_status: DonationStatus,
}

/// Apply an observed terminal outcome to the ledger exactly once.
///
/// Both confirmation channels and the sweeper funnel through here, so they
/// are commutative by construction: whichever caller's conditional write
/// lands first wins; every other caller sees `applied = false` and the
/// already-recorded status. The `applied` flag is the sole gate for the
/// notifier, which is spawned so its outcome can never affect the
/// reconciliation result.
pub async fn reconcile(
    ledger: &dyn Ledger,
    notifier: Arc<dyn Notifier>,
    intent: &DonationIntent,
    observation: TerminalObservation,
) -> Result<ReconcileOutcome, DonationError> {
    // Fast path on a stale read is safe: terminal never regresses.
    if intent.status().is_terminal() {
        tracing::debug!(
            donation_id = %intent.id(),
            status = %intent.status(),
            "already terminal, reconcile is a no-op"
        );
        return Ok(ReconcileOutcome {
            applied: false,
            final_status: intent.status(),
        });
    }

    let applied = ledger
        .settle(intent.id(), observation.status, &observation.raw_payload)
        .await?;

    if applied {
        let final_status = observation.status.as_status();
        tracing::info!(
            donation_id = %intent.id(),
            %final_status,
            "terminal transition applied"
        );

        let settled = intent.clone();
        tokio::spawn(async move {
            notifier.donation_settled(settled, final_status).await;
        });

        return Ok(ReconcileOutcome {
            applied: true,
            final_status,
        });
    }

    // Lost the race: some other channel settled this intent between our
    // read and our write. Re-read to report what actually got recorded.
    let current = ledger.find(intent.id()).await?.ok_or_else(|| {
        DonationError::NotFound(format!("donation {} vanished mid-reconcile", intent.id()))
    })?;

    tracing::info!(
        donation_id = %intent.id(),
        final_status = %current.status(),
        "conditional write lost, confirming existing terminal status"
    );

    Ok(ReconcileOutcome {
        applied: false,
        final_status: current.status(),
    })
}
