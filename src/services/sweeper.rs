use {
    crate::domain::{error::DonationError, ledger::Ledger, notifier::Notifier},
    crate::services::reconcile::{TerminalObservation, reconcile},
    chrono::Utc,
    std::{sync::Arc, time::Duration},
    tokio::sync::watch,
};

/// Cancel PENDING intents older than `max_age`.
///
/// Each row goes through the same conditional write as the confirmation
/// channels, so a sweep racing a very late webhook cannot clobber a row
/// that just became terminal — one of them wins, the other no-ops. That
/// also makes the sweep idempotent and safe to run concurrently with
/// itself, with no coordination lock.
pub async fn sweep(
    ledger: &dyn Ledger,
    notifier: Arc<dyn Notifier>,
    max_age: Duration,
) -> Result<u64, DonationError> {
    let max_age = chrono::Duration::from_std(max_age)
        .map_err(|e| DonationError::Internal(format!("sweep max_age out of range: {e}")))?;
    let cutoff = Utc::now() - max_age;

    let ids = ledger.expired_pending(cutoff).await?;
    let mut cleaned = 0u64;

    for id in ids {
        // Row may have settled between the select and now; find + reconcile
        // tolerate both disappearance and a lost race.
        let Some(intent) = ledger.find(id).await? else {
            continue;
        };
        let outcome = reconcile(
            ledger,
            notifier.clone(),
            &intent,
            TerminalObservation::abandoned(),
        )
        .await?;
        if outcome.applied {
            cleaned += 1;
        }
    }

    if cleaned > 0 {
        tracing::info!(cleaned, "expired PENDING intents cancelled");
    }
    Ok(cleaned)
}

/// Background sweep loop. Runs until the shutdown signal flips.
pub async fn run_sweeper(
    ledger: Arc<dyn Ledger>,
    notifier: Arc<dyn Notifier>,
    max_age: Duration,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::info!(?interval, ?max_age, "expiry sweeper started");

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                tracing::info!("expiry sweeper shutting down");
                return;
            }
            _ = tokio::time::sleep(interval) => {}
        }

        if let Err(e) = sweep(ledger.as_ref(), notifier.clone(), max_age).await {
            tracing::error!(error = %e, "sweep pass failed");
        }
    }
}
