use {
    super::donation::{DonationIntent, DonationStatus},
    std::{future::Future, pin::Pin},
};

/// Outbound side effect fired exactly once per terminal transition.
/// Failures are the notifier's problem: reconciliation has already
/// committed by the time this runs, and never rolls back for it.
pub trait Notifier: Send + Sync {
    fn donation_settled(
        &self,
        intent: DonationIntent,
        status: DonationStatus,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Default notifier: structured log line per settlement. The real mail
/// dispatch lives outside this service.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn donation_settled(
        &self,
        intent: DonationIntent,
        status: DonationStatus,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            tracing::info!(
                donation_id = %intent.id(),
                donor_email = %intent.donor_email(),
                amount = %intent.amount(),
                currency = %intent.currency(),
                %status,
                "donation settled, notification dispatched"
            );
        })
    }
}
