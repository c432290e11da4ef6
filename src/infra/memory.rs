use {
    crate::domain::{
        donation::{
            DonationIntent, DonationIntentRow, DonationStatus, GatewayReference,
            NewDonationIntent, TerminalStatus,
        },
        error::DonationError,
        ledger::Ledger,
    },
    chrono::{DateTime, Utc},
    std::{
        collections::HashMap,
        future::Future,
        pin::Pin,
        sync::Mutex,
    },
    uuid::Uuid,
};

struct MemoryRow {
    intent: NewDonationIntent,
    gateway_reference: Option<GatewayReference>,
    status: DonationStatus,
    gateway_response: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MemoryRow {
    fn to_intent(&self) -> DonationIntent {
        DonationIntent::from_row(DonationIntentRow {
            id: self.intent.id(),
            donor_name: self.intent.donor_name().to_string(),
            donor_email: self.intent.donor_email().to_string(),
            donor_phone: self.intent.donor_phone().map(str::to_string),
            amount: self.intent.amount(),
            currency: self.intent.currency(),
            donation_type: self.intent.donation_type(),
            is_anonymous: self.intent.is_anonymous(),
            message: self.intent.message().map(str::to_string),
            gateway_reference: self.gateway_reference.clone(),
            status: self.status,
            gateway_response: self.gateway_response.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// In-memory ledger with the same conditional-write contract as
/// `PgLedger`; the mutex stands in for row-level statement atomicity.
/// Used by the integration tests to drive races without a database.
#[derive(Default)]
pub struct MemoryLedger {
    rows: Mutex<HashMap<Uuid, MemoryRow>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: backdate a row so sweep cutoffs can be exercised.
    pub fn backdate(&self, id: Uuid, created_at: DateTime<Utc>) {
        if let Some(row) = self.rows.lock().expect("ledger poisoned").get_mut(&id) {
            row.created_at = created_at;
        }
    }
}

impl Ledger for MemoryLedger {
    fn insert(
        &self,
        intent: &NewDonationIntent,
    ) -> Pin<Box<dyn Future<Output = Result<(), DonationError>> + Send + '_>> {
        let intent = intent.clone();
        Box::pin(async move {
            let now = Utc::now();
            let mut rows = self.rows.lock().expect("ledger poisoned");
            rows.insert(
                intent.id(),
                MemoryRow {
                    intent,
                    gateway_reference: None,
                    status: DonationStatus::Pending,
                    gateway_response: None,
                    created_at: now,
                    updated_at: now,
                },
            );
            Ok(())
        })
    }

    fn attach_reference(
        &self,
        id: Uuid,
        reference: &GatewayReference,
    ) -> Pin<Box<dyn Future<Output = Result<bool, DonationError>> + Send + '_>> {
        let reference = reference.clone();
        Box::pin(async move {
            let mut rows = self.rows.lock().expect("ledger poisoned");
            match rows.get_mut(&id) {
                Some(row) if row.gateway_reference.is_none() => {
                    row.gateway_reference = Some(reference);
                    row.updated_at = Utc::now();
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }

    fn find(
        &self,
        id: Uuid,
    ) -> Pin<Box<dyn Future<Output = Result<Option<DonationIntent>, DonationError>> + Send + '_>>
    {
        Box::pin(async move {
            let rows = self.rows.lock().expect("ledger poisoned");
            Ok(rows.get(&id).map(MemoryRow::to_intent))
        })
    }

    fn find_by_reference(
        &self,
        reference: &GatewayReference,
    ) -> Pin<Box<dyn Future<Output = Result<Option<DonationIntent>, DonationError>> + Send + '_>>
    {
        let reference = reference.clone();
        Box::pin(async move {
            let rows = self.rows.lock().expect("ledger poisoned");
            Ok(rows
                .values()
                .find(|row| row.gateway_reference.as_ref() == Some(&reference))
                .map(MemoryRow::to_intent))
        })
    }

    fn settle(
        &self,
        id: Uuid,
        status: TerminalStatus,
        raw_payload: &serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = Result<bool, DonationError>> + Send + '_>> {
        let raw_payload = raw_payload.clone();
        Box::pin(async move {
            let mut rows = self.rows.lock().expect("ledger poisoned");
            match rows.get_mut(&id) {
                Some(row) if row.status == DonationStatus::Pending => {
                    row.status = status.as_status();
                    row.gateway_response = Some(raw_payload);
                    row.updated_at = Utc::now();
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }

    fn expired_pending(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Uuid>, DonationError>> + Send + '_>> {
        Box::pin(async move {
            let rows = self.rows.lock().expect("ledger poisoned");
            Ok(rows
                .values()
                .filter(|row| row.status == DonationStatus::Pending && row.created_at < cutoff)
                .map(|row| row.intent.id())
                .collect())
        })
    }
}
