use {
    super::donation::{DonationIntent, GatewayReference, NewDonationIntent, TerminalStatus},
    super::error::DonationError,
    chrono::{DateTime, Utc},
    std::{future::Future, pin::Pin},
    uuid::Uuid,
};

type LedgerFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DonationError>> + Send + 'a>>;

/// The durable donation ledger. This trait is the only mutation surface
/// after creation, and `settle` is the only way a status ever leaves
/// PENDING.
pub trait Ledger: Send + Sync {
    /// Persist a fresh PENDING intent (no gateway reference yet).
    fn insert(&self, intent: &NewDonationIntent) -> LedgerFuture<'_, ()>;

    /// Attach the gateway reference, conditional on none being set.
    /// Returns `false` if a reference was already attached — the caller
    /// must treat that as a bug, never as a reason to overwrite.
    fn attach_reference(&self, id: Uuid, reference: &GatewayReference) -> LedgerFuture<'_, bool>;

    fn find(&self, id: Uuid) -> LedgerFuture<'_, Option<DonationIntent>>;

    fn find_by_reference(
        &self,
        reference: &GatewayReference,
    ) -> LedgerFuture<'_, Option<DonationIntent>>;

    /// The conditional write at the heart of reconciliation: atomically set
    /// the terminal status and raw gateway payload, but only if the row's
    /// status is still PENDING at write time. Returns whether this call
    /// applied the transition. Exactly one concurrent caller can get `true`.
    fn settle(
        &self,
        id: Uuid,
        status: TerminalStatus,
        raw_payload: &serde_json::Value,
    ) -> LedgerFuture<'_, bool>;

    /// Ids of PENDING intents created strictly before `cutoff`.
    fn expired_pending(&self, cutoff: DateTime<Utc>) -> LedgerFuture<'_, Vec<Uuid>>;
}
